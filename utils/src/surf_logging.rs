use std::time::Instant;
use surf::middleware::{Middleware, Next};
use surf::{Client, Request, Response};

/// Logs every outgoing request with its status and round-trip time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurfLogging;

#[surf::utils::async_trait]
impl Middleware for SurfLogging {
    async fn handle(&self, req: Request, client: Client, next: Next<'_>) -> surf::Result<Response> {
        let method = req.method();
        let url = req.url().clone();
        log::debug!("--> {} {}", method, url);

        let started = Instant::now();
        match next.run(req, client).await {
            Ok(res) => {
                log::debug!(
                    "<-- {} {} {} ({} ms)",
                    res.status(),
                    method,
                    url,
                    started.elapsed().as_millis()
                );
                Ok(res)
            }
            Err(err) => {
                log::warn!("<-- {} {} failed: {}", method, url, err);
                Err(err)
            }
        }
    }
}
