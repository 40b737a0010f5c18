//! The long-poll loop under a supervisor, fed by an in-memory endpoint.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use pollvisor::{
    Fetch, FetchError, FetchRequest, LongPoll, PollConfig, RetryPolicy, Supervisor,
    SupervisorConfig, TaskError, TaskFn, Update,
};

/// Replays canned replies, then blocks like an idle long poll.
#[derive(Clone, Default)]
struct Replay {
    replies: Arc<Mutex<VecDeque<Result<Vec<Update<String>>, FetchError>>>>,
    offsets: Arc<Mutex<Vec<u64>>>,
}

impl Replay {
    fn new(replies: Vec<Result<Vec<Update<String>>, FetchError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            offsets: Arc::default(),
        }
    }

    fn offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }

    async fn until_fetches(&self, n: usize) {
        while self.offsets().len() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Fetch<String> for Replay {
    async fn fetch(&self, req: FetchRequest) -> Result<Vec<Update<String>>, FetchError> {
        self.offsets.lock().unwrap().push(req.offset);
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => std::future::pending().await,
        }
    }
}

fn update(id: u64, text: &str) -> Update<String> {
    Update {
        id,
        payload: text.to_string(),
    }
}

fn config() -> PollConfig {
    let mut cfg = PollConfig::new("http://in-memory/getUpdates");
    cfg.retry = RetryPolicy::immediate();
    cfg
}

#[tokio::test]
async fn delivers_in_order_and_stops_cleanly() {
    let replay = Replay::new(vec![
        Ok(vec![update(3, "c"), update(1, "a"), update(2, "b")]),
        Ok(vec![]),
        Err(FetchError::Status {
            status: 502,
            description: "bad gateway".into(),
        }),
        Ok(vec![update(2, "b-again"), update(4, "d")]),
    ]);
    let (poller, mut rx) = LongPoll::new("long-poll", replay.clone(), config());

    let sup = Supervisor::new(SupervisorConfig::new(Duration::from_secs(1)));
    sup.register(Arc::new(poller));

    let mut got = Vec::new();
    while got.len() < 4 {
        got.push(rx.recv().await.expect("loop closed early"));
    }
    assert_eq!(got, vec!["a", "b", "c", "d"]);

    replay.until_fetches(5).await;
    sup.shutdown();
    assert_eq!(sup.wait(&[]).await, Ok(()));
    assert_eq!(rx.recv().await, None);
    assert_eq!(replay.offsets(), vec![0, 4, 4, 4, 5]);
}

#[tokio::test]
async fn consumer_task_sees_every_item_before_close() {
    let replay = Replay::new(vec![Ok(vec![update(10, "x"), update(11, "y")])]);
    let (poller, rx) = LongPoll::new("long-poll", replay.clone(), config());

    let received = Arc::new(Mutex::new(Vec::new()));
    let rx = Arc::new(tokio::sync::Mutex::new(Some(rx)));
    let sink = Arc::clone(&received);
    let consumer = TaskFn::arc("consumer", move |_lifetime: CancellationToken| {
        let rx = Arc::clone(&rx);
        let sink = Arc::clone(&sink);
        async move {
            let mut rx = rx.lock().await.take().ok_or_else(|| TaskError::fatal("taken"))?;
            while let Some(item) = rx.recv().await {
                sink.lock().unwrap().push(item);
            }
            Ok::<(), TaskError>(())
        }
    });

    let sup = Supervisor::default();
    sup.register(Arc::new(poller));
    sup.register(consumer);

    // The second fetch shows the batch was handed off.
    replay.until_fetches(2).await;
    sup.shutdown();

    assert_eq!(sup.wait(&[]).await, Ok(()));
    assert_eq!(*received.lock().unwrap(), vec!["x", "y"]);
    assert_eq!(replay.offsets(), vec![0, 12]);
}
