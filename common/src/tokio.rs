use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

use crate::herald_err;
use crate::protocol::SocketData;
use crate::utils::errors::{HeraldError, HeraldErrorKind};

pub struct SizedMessageObj {
    buffer: Vec<u8>,
}

impl SizedMessageObj {
    /// The ONLY way to create a message for the wire.
    /// This guarantees Bincode is used every time.
    pub fn from_struct<T: Serialize>(data: &T) -> Result<Self, HeraldError> {
        let buffer = bincode::serde::encode_to_vec(data, bincode::config::standard())
            .map_err(|e| herald_err!(HeraldErrorKind::Serialize, e.to_string()))?;
        Ok(Self { buffer })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Decodes a frame body read with [`AsyncSizedMessage::read_sized`].
    pub fn to_struct<T: DeserializeOwned>(buf: &[u8]) -> Result<T, HeraldError> {
        bincode::serde::decode_from_slice(buf, bincode::config::standard())
            .map(|(value, _)| value)
            .map_err(|e| herald_err!(HeraldErrorKind::Deserialize, e.to_string()))
    }
}

/// Length prefixed framing: a 4-byte big-endian `u32` length followed by
/// the bincode body.
pub trait AsyncSizedMessage {
    fn write_sized<'a>(
        &'a mut self,
        what: SizedMessageObj,
    ) -> impl Future<Output = Result<(), HeraldError>> + Send + 'a;
    fn read_sized<'a>(
        &'a mut self,
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send + 'a;
}

async fn write_frame<W: AsyncWrite + Unpin + Send>(
    writer: &mut W,
    what: SizedMessageObj,
) -> Result<(), HeraldError> {
    let buf_len: u32 = what
        .bytes()
        .len()
        .try_into()
        .ok()
        .filter(|len| *len <= SocketData::MAX_FRAME_LEN)
        .ok_or_else(|| herald_err!(HeraldErrorKind::InvalidData, "message too long"))?;

    writer
        .write_all(&buf_len.to_be_bytes())
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::StreamWrite, e.to_string()))?;
    writer
        .write_all(what.bytes())
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::StreamWrite, e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::StreamWrite, e.to_string()))
}

async fn read_frame<R: AsyncRead + Unpin + Send>(reader: &mut R) -> Result<Vec<u8>, HeraldError> {
    let mut buf_len = [0u8; 4];

    // Read message length
    reader
        .read_exact(&mut buf_len)
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::StreamRead, e.to_string()))?;
    let msg_len = u32::from_be_bytes(buf_len);
    if msg_len > SocketData::MAX_FRAME_LEN {
        return Err(herald_err!(
            HeraldErrorKind::InvalidData,
            "frame of {} bytes exceeds limit",
            msg_len
        ));
    }

    let mut buf = vec![0u8; msg_len as usize];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::StreamRead, e.to_string()))?;

    Ok(buf)
}

impl AsyncSizedMessage for UnixStream {
    fn write_sized<'a>(
        &'a mut self,
        what: SizedMessageObj,
    ) -> impl Future<Output = Result<(), HeraldError>> + Send + 'a {
        write_frame(self, what)
    }
    fn read_sized<'a>(
        &'a mut self,
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send + 'a {
        read_frame(self)
    }
}

impl AsyncSizedMessage for OwnedReadHalf {
    fn write_sized<'a>(
        &'a mut self,
        _what: SizedMessageObj,
    ) -> impl Future<Output = Result<(), HeraldError>> + Send + 'a {
        async move {
            Err(herald_err!(
                HeraldErrorKind::StreamWrite,
                "Cannot write from ReadHalf"
            ))
        }
    }
    fn read_sized<'a>(
        &'a mut self,
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send + 'a {
        read_frame(self)
    }
}

impl AsyncSizedMessage for OwnedWriteHalf {
    fn write_sized<'a>(
        &'a mut self,
        what: SizedMessageObj,
    ) -> impl Future<Output = Result<(), HeraldError>> + Send + 'a {
        write_frame(self, what)
    }
    fn read_sized<'a>(
        &'a mut self,
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send + 'a {
        async move {
            Err(herald_err!(
                HeraldErrorKind::StreamRead,
                "Cannot read to WriteHalf"
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Carrier, OutgoingEvent};
    use crate::payload::{Field, NotificationPayload};
    use crate::protocol::{Request, Response};

    #[tokio::test]
    async fn request_and_response_cross_a_socket_pair() {
        let (mut client, mut server) = UnixStream::pair().unwrap();

        let req = Request::Reply {
            id: 3,
            message: "thanks".into(),
        };
        client
            .write_sized(SizedMessageObj::from_struct(&req).unwrap())
            .await
            .unwrap();
        let buf = server.read_sized().await.unwrap();
        assert_eq!(SizedMessageObj::to_struct::<Request>(&buf).unwrap(), req);

        let mut payload = NotificationPayload::new();
        payload.insert(Field::Id, 3i32);
        payload.insert(Field::Title, None::<String>);
        let mut event = OutgoingEvent::new("herald.notification.event");
        event.extras.insert("id".into(), Carrier::Int(3));

        for resp in [
            Response::Notifications(vec![payload]),
            Response::Event(event),
        ] {
            server
                .write_sized(SizedMessageObj::from_struct(&resp).unwrap())
                .await
                .unwrap();
            let buf = client.read_sized().await.unwrap();
            assert_eq!(SizedMessageObj::to_struct::<Response>(&buf).unwrap(), resp);
        }
    }

    #[tokio::test]
    async fn oversized_frames_are_rejected() {
        let (mut client, mut server) = UnixStream::pair().unwrap();
        client
            .write_all(&(SocketData::MAX_FRAME_LEN + 1).to_be_bytes())
            .await
            .unwrap();

        let err = server.read_sized().await.unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn split_halves_only_go_one_way() {
        let (client, server) = UnixStream::pair().unwrap();
        let (mut read_half, _) = client.into_split();
        let (_, mut write_half) = server.into_split();

        assert!(
            read_half
                .write_sized(SizedMessageObj::from_struct(&Request::Ping).unwrap())
                .await
                .is_err()
        );
        assert!(write_half.read_sized().await.is_err());
    }

    #[tokio::test]
    async fn closed_peer_is_stream_read_error() {
        let (client, mut server) = UnixStream::pair().unwrap();
        drop(client);
        let err = server.read_sized().await.unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::StreamRead);
    }
}
