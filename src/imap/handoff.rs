// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bounded producer/consumer handoff for IMAP response streams.
//!
//! LIST and FETCH responses arrive as a stream of fallible items. [`drain`]
//! moves them through a bounded channel: the producer side forwards items
//! until the source ends or yields an error, the consumer side collects until
//! the channel closes. A closed channel is the end-of-stream signal; an `Err`
//! item is the failure signal and stops both sides.

use futures_util::stream::{BoxStream, StreamExt};
use log::trace;
use tokio::sync::mpsc;

use crate::imap::error::ImapError;

/// Buffer size between the protocol reader and the consumer.
pub const STREAM_BUFFER: usize = 10;

/// Drains `source` through a channel of `capacity` slots.
///
/// Every item is passed to `accept`; items it maps to `Some` are collected in
/// arrival order. The first `Err` from the source aborts the drain and is
/// returned as-is, discarding whatever was collected.
pub async fn drain<'a, T, U, F>(
    source: BoxStream<'a, Result<T, ImapError>>,
    capacity: usize,
    mut accept: F,
) -> Result<Vec<U>, ImapError>
where
    T: Send + 'a,
    F: FnMut(T) -> Option<U>,
{
    let (tx, mut rx) = mpsc::channel::<Result<T, ImapError>>(capacity.max(1));

    let producer = async move {
        let mut source = source;
        let mut forwarded = 0usize;
        while let Some(item) = source.next().await {
            let failed = item.is_err();
            if tx.send(item).await.is_err() {
                // Consumer gave up; nobody is listening any more.
                break;
            }
            forwarded += 1;
            if failed {
                break;
            }
        }
        trace!("Stream producer finished after {} items", forwarded);
        // `tx` drops here, closing the channel.
    };

    let consumer = async move {
        let mut collected = Vec::new();
        while let Some(item) = rx.recv().await {
            if let Some(value) = accept(item?) {
                collected.push(value);
            }
        }
        Ok::<_, ImapError>(collected)
    };

    let ((), result) = tokio::join!(producer, consumer);
    result
}
