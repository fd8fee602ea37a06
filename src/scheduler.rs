use cron::Schedule;
use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;

const MIN_SLEEP: Duration = Duration::from_millis(500);

fn time_till_next_call(schedule: &Schedule) -> Duration {
    let now = chrono::Utc::now();
    schedule
        .upcoming(chrono::Utc)
        .next()
        .and_then(|next| (next - now).to_std().ok())
        .unwrap_or(MIN_SLEEP)
}

/// Runs `run` forever on the tokio runtime, each time the `schedule` fires.
pub fn spawn_job<F, Fut>(schedule: Schedule, name: &'static str, run: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let sleep_duration = time_till_next_call(&schedule);
            log::debug!(
                "scheduled job '{}' will run again in {:?}",
                name,
                sleep_duration
            );
            tokio::time::sleep(sleep_duration).await;
            log::debug!("running scheduled job '{}'", name);
            run().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        str::FromStr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    #[tokio::test]
    async fn job_runs_on_schedule() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = {
            let counter = counter.clone();
            spawn_job(
                Schedule::from_str("* * * * * * *").unwrap(),
                "count",
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                },
            )
        };
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.abort();
        assert!(counter.load(Ordering::SeqCst) >= 1);
    }
}
