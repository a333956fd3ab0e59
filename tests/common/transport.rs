//! In-memory transports for the connection pumps
//!
//! `peer_stream` plays the remote client on the read side; the sinks capture
//! what the write pump sends (or misbehave on purpose).

use futures_util::sink::{self, Sink};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use studyhub::backend::hub::Frame;

pub type TestSink = Pin<Box<dyn Sink<Frame, Error = String> + Send>>;

/// Inbound stream fed by the returned sender
pub fn peer_stream() -> (mpsc::Sender<Result<Frame, String>>, ReceiverStream<Result<Frame, String>>) {
    let (tx, rx) = mpsc::channel(64);
    (tx, ReceiverStream::new(rx))
}

/// Sink that forwards every frame to the returned receiver
pub fn recording_sink() -> (TestSink, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = sink::unfold(tx, |tx, frame: Frame| async move {
        tx.send(frame).map_err(|e| e.to_string())?;
        Ok::<_, String>(tx)
    });
    (Box::pin(sink), rx)
}

/// Sink whose every write fails
pub fn failing_sink() -> TestSink {
    Box::pin(sink::unfold((), |(), _frame: Frame| async move {
        Err::<(), String>("connection reset".to_string())
    }))
}

/// Sink whose writes never complete
pub fn stalled_sink() -> TestSink {
    Box::pin(sink::unfold((), |(), _frame: Frame| std::future::pending::<Result<(), String>>()))
}
