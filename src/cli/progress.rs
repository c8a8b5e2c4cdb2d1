//! Terminal progress rendering for download runs
//!
//! Subscribes to a run's progress channel and renders an indicatif bar.
//! The subscription has an explicit end: the task exits when the tracker
//! publishes its terminal update (or the tracker is dropped), so no
//! polling loop outlives the run.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::progress::ProgressUpdate;
use crate::constants::progress;

/// Spawn a task rendering progress updates until the run finishes
pub fn spawn_progress_bar(mut updates: watch::Receiver<ProgressUpdate>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} pages ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("=>-"),
        );
        bar.enable_steady_tick(progress::TICK_INTERVAL);

        loop {
            match *updates.borrow_and_update() {
                ProgressUpdate::Idle => {}
                ProgressUpdate::Running(snapshot) => {
                    bar.set_length(snapshot.total);
                    bar.set_position(snapshot.completed);
                }
                ProgressUpdate::Finished(snapshot) => {
                    bar.set_length(snapshot.total);
                    bar.set_position(snapshot.completed);
                    bar.finish_with_message("done");
                    break;
                }
            }

            if updates.changed().await.is_err() {
                // tracker dropped without finishing; stop rendering
                bar.abandon();
                break;
            }
        }
    })
}
