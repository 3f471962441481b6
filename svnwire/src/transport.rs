//! Turning a connection URL into a running `svnserve -t` child process.

use std::io::{ChildStdin, ChildStdout};
use std::process::{Child, Command, Stdio};

use url::Url;

use crate::error::Error;

/// The live child process transport for a [`crate::Client`], plus the URL
/// string to present to the server during the greeting exchange.
pub struct Transport {
    pub child: Child,
    pub reader: ChildStdout,
    pub writer: ChildStdin,
    pub url: String,
}

/// Spawns the transport for `address`: `file://` launches a local
/// `svnserve -t`; `svn+ssh://` tunnels the same command over `ssh`. Any
/// other scheme is unimplemented.
pub fn spawn(address: &str) -> Result<Transport, Error> {
    let mut url = Url::parse(address)
        .map_err(|e| Error::protocol(format!("parsing connection URL {address:?}: {e}")))?;

    let mut command = match url.scheme() {
        "file" => {
            // svnserve rejects a "file:" scheme in the greeting payload, so
            // the URL handed to the server is rewritten to "svn+ssh" even
            // though the transport itself is a local child process.
            let _ = url.set_scheme("svn+ssh");
            let mut cmd = Command::new("svnserve");
            cmd.arg("-t");
            cmd
        }
        "svn+ssh" => {
            let host = match url.host_str() {
                Some(host) if !url.username().is_empty() => {
                    format!("{}@{host}", url.username())
                }
                Some(host) => host.to_string(),
                None => {
                    return Err(Error::protocol(format!(
                        "connection URL {address:?} is missing a host"
                    )))
                }
            };
            let mut cmd = Command::new("ssh");
            cmd.args(["-q", "-o", "ControlMaster=no", "--", &host, "svnserve", "-t"]);
            cmd
        }
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    };

    command.stdin(Stdio::piped()).stdout(Stdio::piped());
    let mut child = command.spawn()?;
    let writer = child.stdin.take().expect("stdin was requested as piped");
    let reader = child.stdout.take().expect("stdout was requested as piped");

    Ok(Transport {
        child,
        reader,
        writer,
        url: url.to_string(),
    })
}
