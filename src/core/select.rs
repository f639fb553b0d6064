//! # Dynamic multiplexed receive.
//!
//! Awaits, in one step, every active signaler channel plus the completion
//! channel. The case set is rebuilt on each call from whatever receivers are
//! still active, so evictions simply shrink the slice.
//!
//! ```text
//! receivers[0].recv() ─┐
//! receivers[1].recv() ─┤
//!        ...          ├──► select_all ──► Wake
//! receivers[n].recv() ─┤
//! done.recv()  ────────┘
//! ```
//!
//! `select_all` polls cases in order; the order is rotated by `turn` so a
//! signaler that is always ready cannot starve the others. Dropping the
//! unfinished `recv()` futures loses nothing (`mpsc::Receiver::recv` is
//! cancel-safe).

use futures::future::{BoxFuture, FutureExt, select_all};

use super::actor::DoneReceiver;
use crate::error::WorkerError;
use crate::signals::{Control, ControlReceiver};

/// Which case completed.
pub(crate) enum Wake {
    /// Signaler at `index` delivered a control function, or closed (`None`).
    Control {
        index: usize,
        control: Option<Control>,
    },
    /// The worker task reported (`None` if it vanished without reporting).
    Done(Option<Result<(), WorkerError>>),
}

/// Waits for the first ready case among `receivers` and `done`.
pub(crate) async fn next_wake(
    receivers: &mut [ControlReceiver],
    done: &mut DoneReceiver,
    turn: usize,
) -> Wake {
    let mut cases: Vec<BoxFuture<'_, Wake>> = Vec::with_capacity(receivers.len() + 1);
    for (index, rx) in receivers.iter_mut().enumerate() {
        cases.push(
            async move {
                Wake::Control {
                    index,
                    control: rx.recv().await,
                }
            }
            .boxed(),
        );
    }
    cases.push(async move { Wake::Done(done.recv().await) }.boxed());

    let len = cases.len();
    cases.rotate_left(turn % len);
    let (wake, _, _) = select_all(cases).await;
    wake
}
