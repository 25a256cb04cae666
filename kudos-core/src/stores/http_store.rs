// File: kudos-core/src/stores/http_store.rs
//
// REST adapter for the roster backend:
//   GET  {base}/streamers          -> [Streamer]
//   GET  {base}/streamers/{id}     -> Streamer
//   POST {base}/streamers          <- Streamer
//   PUT  {base}/streamers/{id}     <- Streamer

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use kudos_common::models::Streamer;
use crate::http::{DefaultHttpClient, HttpClient};
use crate::{Error, StreamerStore};

pub struct HttpStreamerStore<C: HttpClient = DefaultHttpClient> {
    base: Url,
    client: C,
}

impl HttpStreamerStore<DefaultHttpClient> {
    pub fn new(base: Url) -> Self {
        Self::with_client(base, DefaultHttpClient::new())
    }
}

impl<C: HttpClient> HttpStreamerStore<C> {
    pub fn with_client(mut base: Url, client: C) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base, client }
    }

    fn collection_url(&self) -> Result<Url, Error> {
        Ok(self.base.join("streamers")?)
    }

    fn item_url(&self, streamer_id: i64) -> Result<Url, Error> {
        Ok(self.base.join(&format!("streamers/{}", streamer_id))?)
    }
}

#[async_trait]
impl<C: HttpClient> StreamerStore for HttpStreamerStore<C> {
    async fn list_streamers(&self) -> Result<Vec<Streamer>, Error> {
        let url = self.collection_url()?;
        let body = self.client.get(url.to_string()).await?;
        let streamers: Vec<Streamer> = serde_json::from_str(&body)?;
        debug!("GET {} -> {} streamers", url, streamers.len());
        Ok(streamers)
    }

    async fn fetch_streamer(&self, streamer_id: i64) -> Result<Streamer, Error> {
        let url = self.item_url(streamer_id)?;
        let body = self.client.get(url.to_string()).await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(Error::NotFound(format!("streamer {}", streamer_id)));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        let url = self.collection_url()?;
        let body = serde_json::to_string(streamer)?;
        self.client.post(url.to_string(), body).await?;
        debug!("POST {} streamer_id={}", url, streamer.streamer_id);
        Ok(())
    }

    async fn update_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        let url = self.item_url(streamer.streamer_id)?;
        let body = serde_json::to_string(streamer)?;
        self.client.put(url.to_string(), body).await?;
        debug!("PUT {} score={}", url, streamer.score);
        Ok(())
    }
}
