//! Full rebuild of the geo index from the catalog, with streamed progress.

use tokio::sync::mpsc;

use geofind_core::Coordinate;

use crate::service::DiscoveryService;

/// Progress events emitted during a reindex run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReindexEvent {
    /// A location landed in the index.
    Added { title: String },
    /// A location could not be indexed; `message` says why.
    Failed { message: String },
    /// The run finished. `total` counts successful adds only; emitted exactly
    /// once, after every record has been attempted.
    Completed { total: usize },
}

impl DiscoveryService {
    /// Rebuild the geo index from the catalog, streaming progress events.
    ///
    /// Returns the receiving end of the event stream immediately; the run
    /// executes on a spawned task and continues even if the receiver is
    /// dropped, so an interrupted stream still leaves a fully rebuilt index.
    ///
    /// Records missing either coordinate are routine (entries awaiting
    /// geocoding) and are skipped without an event. Records whose
    /// coordinates are present but not numeric, or out of range, produce a
    /// [`ReindexEvent::Failed`] and are not counted.
    ///
    /// If the catalog list cannot be fetched the previous index contents are
    /// left in place and the stream ends with `Failed` then
    /// `Completed { total: 0 }`.
    #[must_use]
    pub fn reindex(&self) -> mpsc::Receiver<ReindexEvent> {
        let (tx, rx) = mpsc::channel(32);
        let service = self.clone();
        tokio::spawn(async move {
            service.run_reindex(&tx).await;
        });
        rx
    }

    async fn run_reindex(&self, tx: &mpsc::Sender<ReindexEvent>) {
        let locations = match self.catalog.list_locations().await {
            Ok(locations) => locations,
            Err(e) => {
                tracing::error!(error = %e, "catalog list failed, aborting reindex");
                let _ = tx
                    .send(ReindexEvent::Failed {
                        message: e.to_string(),
                    })
                    .await;
                let _ = tx.send(ReindexEvent::Completed { total: 0 }).await;
                return;
            }
        };

        // Clear only after the catalog answered, so a dead catalog does not
        // wipe a serviceable index.
        if let Err(e) = self.index.clear() {
            tracing::error!(error = %e, "could not clear geo index, aborting reindex");
            let _ = tx
                .send(ReindexEvent::Failed {
                    message: e.to_string(),
                })
                .await;
            let _ = tx.send(ReindexEvent::Completed { total: 0 }).await;
            return;
        }

        let record_count = locations.len();
        let mut total = 0usize;
        for location in locations {
            let (Some(raw_lat), Some(raw_lng)) = (&location.lat, &location.lng) else {
                continue;
            };

            let event = match (raw_lat.to_f64(), raw_lng.to_f64()) {
                (Some(lat), Some(lng)) => {
                    let id = location.id.as_deref().unwrap_or(location.title.as_str());
                    match self.index.insert(id, Coordinate::new(lat, lng)) {
                        Ok(()) => {
                            total += 1;
                            ReindexEvent::Added {
                                title: location.title.clone(),
                            }
                        }
                        Err(e) => ReindexEvent::Failed {
                            message: e.to_string(),
                        },
                    }
                }
                _ => ReindexEvent::Failed {
                    message: format!(
                        "cannot index '{}': coordinates are not numeric (lat='{raw_lat}', lng='{raw_lng}')",
                        location.title
                    ),
                },
            };
            let _ = tx.send(event).await;
        }

        tracing::info!(total, record_count, "geo index rebuilt");
        let _ = tx.send(ReindexEvent::Completed { total }).await;
    }
}
