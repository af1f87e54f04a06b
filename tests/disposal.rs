use async_trait::async_trait;
use cinder_di::{AsyncDispose, Container, DiResult, Dispose};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<&'static str>>>;

struct Cache {
    log: Log,
}

impl Dispose for Cache {
    fn dispose(&self) {
        self.log.lock().unwrap().push("cache");
    }
}

struct Client {
    log: Log,
}

#[async_trait]
impl AsyncDispose for Client {
    async fn dispose(&self) {
        self.log.lock().unwrap().push("client");
    }
}

struct Pool {
    log: Log,
}

impl Dispose for Pool {
    fn dispose(&self) {
        self.log.lock().unwrap().push("pool");
    }
}

#[tokio::test]
async fn dispose_runs_async_then_sync_in_lifo_order() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();

    {
        let log = log.clone();
        container.register_factory("pool", move |ctx| {
            let pool = Arc::new(Pool { log: log.clone() });
            ctx.register_disposer(pool.clone());
            DiResult::Ok(pool)
        });
    }
    {
        let log = log.clone();
        container.register_factory("cache", move |ctx| {
            let cache = Arc::new(Cache { log: log.clone() });
            ctx.register_disposer(cache.clone());
            DiResult::Ok(cache)
        });
    }
    {
        let log = log.clone();
        container.register_factory("client", move |ctx| {
            let client = Arc::new(Client { log: log.clone() });
            ctx.register_async_disposer(client.clone());
            DiResult::Ok(client)
        });
    }

    // Construction order fixes hook registration order.
    let _ = container.get::<Arc<Pool>>("pool").unwrap();
    let _ = container.get::<Arc<Cache>>("cache").unwrap();
    let _ = container.get::<Arc<Client>>("client").unwrap();

    container.dispose_all().await;

    // Async hooks first, then sync hooks reversed (cache before pool).
    assert_eq!(*log.lock().unwrap(), vec!["client", "cache", "pool"]);
}

#[tokio::test]
async fn dispose_all_consumes_hooks() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::new();

    {
        let log = log.clone();
        container.register_factory("cache", move |ctx| {
            let cache = Arc::new(Cache { log: log.clone() });
            ctx.register_disposer(cache.clone());
            DiResult::Ok(cache)
        });
    }

    let _ = container.get::<Arc<Cache>>("cache").unwrap();

    container.dispose_all().await;
    container.dispose_all().await;

    assert_eq!(*log.lock().unwrap(), vec!["cache"]);
}
