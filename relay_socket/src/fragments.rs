use actix_http::ws::Item;
use bytes::BytesMut;

use crate::message::Payload;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error("Continuation frame without a first frame")]
    Unexpected,
    #[error("Fragmented text message is not valid UTF-8")]
    InvalidUtf8,
}

/// Reassembles a fragmented websocket message into one [`Payload`].
#[derive(Debug, Default)]
pub struct Fragments {
    /// `true` when the message started as text.
    pending: Option<(bool, BytesMut)>,
}

impl Fragments {
    /// Feeds one continuation item. Returns the whole message once its last
    /// fragment arrived.
    pub fn push(&mut self, item: Item) -> Result<Option<Payload>, FragmentError> {
        match item {
            // a new first frame abandons any unfinished message
            Item::FirstText(bytes) => {
                self.pending = Some((true, BytesMut::from(&bytes[..])));
                Ok(None)
            }
            Item::FirstBinary(bytes) => {
                self.pending = Some((false, BytesMut::from(&bytes[..])));
                Ok(None)
            }
            Item::Continue(bytes) => {
                let (_, buf) = self.pending.as_mut().ok_or(FragmentError::Unexpected)?;
                buf.extend_from_slice(&bytes);
                Ok(None)
            }
            Item::Last(bytes) => {
                let (text, mut buf) = self.pending.take().ok_or(FragmentError::Unexpected)?;
                buf.extend_from_slice(&bytes);
                let bytes = buf.freeze();
                if text {
                    String::from_utf8(bytes.to_vec())
                        .map(|text| Some(Payload::Text(text)))
                        .map_err(|_| FragmentError::InvalidUtf8)
                } else {
                    Ok(Some(Payload::Binary(bytes)))
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
