use std::path::Path;

use common::herald_err;
use common::protocol::{Request, Response};
use common::tokio::{AsyncSizedMessage, SizedMessageObj};
use common::utils::errors::{HeraldError, HeraldErrorKind};
use tokio::net::UnixStream;
use tracing::debug;

pub struct ClientConnection {
    stream: UnixStream,
}
impl ClientConnection {
    pub async fn new(socket_path: &Path) -> Result<Self, HeraldError> {
        let stream = UnixStream::connect(socket_path).await.map_err(|e| {
            herald_err!(
                HeraldErrorKind::StreamConnect,
                "{}: {}",
                socket_path.display(),
                e
            )
        })?;
        debug!(path = %socket_path.display(), "connected to daemon");

        Ok(Self { stream })
    }

    pub async fn send(&mut self, req: Request) -> Result<Response, HeraldError> {
        self.stream
            .write_sized(SizedMessageObj::from_struct(&req)?)
            .await?;
        self.recv().await
    }

    /// Reads the next response, used after [`Request::Subscribe`].
    pub async fn recv(&mut self) -> Result<Response, HeraldError> {
        let buf = self.stream.read_sized().await?;
        SizedMessageObj::to_struct(&buf)
    }
}
