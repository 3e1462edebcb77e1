//! Instagram Graph API client
//!
//! Every call passes the page access token as the `access_token` query
//! parameter. Publishing is a two-step flow: create a media container, then
//! publish it.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::instagram::{GraphError, InstagramError};
use crate::shared::config::InstagramSettings;

/// Graph API limit on carousel children
pub const MAX_CAROUSEL_ITEMS: usize = 10;

static SHORTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"instagram\.com/(?:[A-Za-z0-9_.]+/)?(?:p|reel|tv)/([A-Za-z0-9_-]+)")
        .expect("valid shortcode regex")
});

/// Post shortcode from a permalink
pub fn shortcode_from_permalink(permalink: &str) -> Option<String> {
    SHORTCODE
        .captures(permalink)
        .map(|caps| caps[1].to_string())
}

/// A published post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestMedia {
    pub id: String,
    pub permalink: Option<String>,
    pub shortcode: Option<String>,
    pub caption: Option<String>,
    pub timestamp: Option<String>,
}

impl LatestMedia {
    fn from_graph(node: &Value) -> Option<Self> {
        let id = node.get("id")?.as_str()?.to_string();
        let text = |field: &str| node.get(field).and_then(Value::as_str).map(str::to_string);
        let permalink = text("permalink");
        Some(Self {
            id,
            shortcode: permalink.as_deref().and_then(shortcode_from_permalink),
            permalink,
            caption: text("caption"),
            timestamp: text("timestamp"),
        })
    }
}

/// What to publish
#[derive(Debug, Clone, Default)]
pub struct PublishPlan {
    /// One URL posts a single image, more post a carousel
    pub image_urls: Vec<String>,
    pub caption: String,
    /// Usernames without `@`
    pub collaborators: Vec<String>,
    /// Create the container but do not publish
    pub dry_run: bool,
}

/// Result of a publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub creation_id: String,
    pub media_id: Option<String>,
    pub permalink: Option<String>,
    pub published: bool,
    /// Publish returned a rate-limit error but the post was found on the account
    pub verified_by_fallback: bool,
    pub collaborators: Vec<String>,
    /// Invite status entries (`id`, `username`, `invite_status`) as returned by the API
    pub collaborators_status: Option<Vec<Value>>,
}

#[derive(Clone, Debug)]
pub struct InstagramClient {
    client: reqwest::Client,
    settings: InstagramSettings,
}

impl InstagramClient {
    pub fn new(client: reqwest::Client, settings: InstagramSettings) -> Self {
        if settings.user_id.is_none() || settings.access_token.is_none() {
            tracing::warn!("IG_USER_ID / IG_ACCESS_TOKEN not set, publishing is disabled");
        }
        Self { client, settings }
    }

    fn credentials(&self) -> Result<(&str, &str), InstagramError> {
        match (&self.settings.user_id, &self.settings.access_token) {
            (Some(user_id), Some(token)) => Ok((user_id.as_str(), token.as_str())),
            _ => Err(InstagramError::MissingCredentials),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.graph_base.trim_end_matches('/'), path)
    }

    /// Send a Graph request and decode the JSON body
    async fn send(&self, stage: &'static str, request: RequestBuilder) -> Result<Value, InstagramError> {
        let (_, token) = self.credentials()?;
        let response = request.query(&[("access_token", token)]).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

        if status.is_client_error() || status.is_server_error() {
            let error = GraphError::from_body(&body);
            tracing::warn!("Graph {} failed ({}): {}", stage, status, error.message);
            return Err(InstagramError::Graph {
                stage,
                status: status.as_u16(),
                error,
                body,
            });
        }
        Ok(body)
    }

    fn id_of(stage: &'static str, body: &Value) -> Result<String, InstagramError> {
        body.get("id")
            .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())))
            .ok_or(InstagramError::MissingId { stage })
    }

    /// Create a single-image container, or a carousel child
    pub async fn create_image_container(
        &self,
        image_url: &str,
        caption: Option<&str>,
        collaborators: &[String],
        carousel_item: bool,
    ) -> Result<String, InstagramError> {
        let (ig_user, _) = self.credentials()?;
        let mut params: Vec<(&str, String)> = vec![("image_url", image_url.to_string())];
        if carousel_item {
            params.push(("is_carousel_item", "true".to_string()));
        }
        if let Some(caption) = caption {
            params.push(("caption", caption.to_string()));
        }
        if !collaborators.is_empty() {
            params.push(("collaborators", serde_json::to_string(collaborators)?));
        }

        let stage = if carousel_item { "carousel item" } else { "media container" };
        let body = self
            .send(stage, self.client.post(self.url(&format!("{ig_user}/media"))).query(&params))
            .await?;
        Self::id_of(stage, &body)
    }

    /// Create the parent container of a carousel
    pub async fn create_carousel_container(
        &self,
        children: &[String],
        caption: &str,
        collaborators: &[String],
    ) -> Result<String, InstagramError> {
        let (ig_user, _) = self.credentials()?;
        let mut params: Vec<(&str, String)> = vec![
            ("media_type", "CAROUSEL".to_string()),
            ("children", children.join(",")),
            ("caption", caption.to_string()),
        ];
        if !collaborators.is_empty() {
            params.push(("collaborators", serde_json::to_string(collaborators)?));
        }

        let body = self
            .send(
                "carousel container",
                self.client.post(self.url(&format!("{ig_user}/media"))).query(&params),
            )
            .await?;
        Self::id_of("carousel container", &body)
    }

    /// Create the container for a plan: single image or carousel
    pub async fn create_container(&self, plan: &PublishPlan) -> Result<String, InstagramError> {
        match plan.image_urls.as_slice() {
            [] => Err(InstagramError::NoImages),
            [single] => {
                self.create_image_container(single, Some(&plan.caption), &plan.collaborators, false)
                    .await
            }
            many => {
                let mut children = Vec::with_capacity(many.len());
                for url in many.iter().take(MAX_CAROUSEL_ITEMS) {
                    children.push(self.create_image_container(url, None, &[], true).await?);
                }
                self.create_carousel_container(&children, &plan.caption, &plan.collaborators)
                    .await
            }
        }
    }

    /// Publish a container, returning the media id
    pub async fn publish_container(&self, creation_id: &str) -> Result<String, InstagramError> {
        let (ig_user, _) = self.credentials()?;
        let body = self
            .send(
                "media_publish",
                self.client
                    .post(self.url(&format!("{ig_user}/media_publish")))
                    .query(&[("creation_id", creation_id)]),
            )
            .await?;
        Self::id_of("media_publish", &body)
    }

    /// Permalink of a media object; failures yield `None`
    pub async fn permalink(&self, media_id: &str) -> Option<String> {
        let request = self
            .client
            .get(self.url(media_id))
            .query(&[("fields", "permalink")]);
        match self.send("permalink", request).await {
            Ok(body) => body.get("permalink").and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                tracing::warn!("Permalink lookup failed for {}: {}", media_id, e);
                None
            }
        }
    }

    async fn collaborator_list(&self, media_id: &str) -> Option<Vec<Value>> {
        let request = self.client.get(self.url(&format!("{media_id}/collaborators")));
        match self.send("collaborators", request).await {
            Ok(body) => Some(
                body.get("data")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            ),
            Err(e) => {
                tracing::warn!("Collaborator lookup failed for {}: {}", media_id, e);
                None
            }
        }
    }

    /// Make sure collaborator invites exist on a published post
    ///
    /// Reads the invite list; when it is empty, invites `usernames` and reads
    /// it again. Failures are logged and reported as `None`.
    pub async fn ensure_collaborators(&self, media_id: &str, usernames: &[String]) -> Option<Vec<Value>> {
        let current = self.collaborator_list(media_id).await;
        if current.as_ref().is_some_and(|list| !list.is_empty()) {
            return current;
        }

        let usernames_json = serde_json::to_string(usernames).ok()?;
        let invite = self
            .client
            .post(self.url(&format!("{media_id}/collaborators")))
            .query(&[("usernames", usernames_json.as_str())]);
        match self.send("collaborators invite", invite).await {
            Ok(_) => self.collaborator_list(media_id).await.or(current),
            Err(e) => {
                tracing::warn!("Collaborator invite failed for {}: {}", media_id, e);
                current
            }
        }
    }

    /// Latest post of the configured account, or of `username` via business discovery
    pub async fn latest_media(&self, username: Option<&str>) -> Result<Option<LatestMedia>, InstagramError> {
        let (ig_user, _) = self.credentials()?;
        const FIELDS: &str = "id,caption,permalink,timestamp";

        let node = match username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(name) => {
                let name = name.trim_start_matches('@');
                let fields = format!("business_discovery.username({name}){{media.limit(1){{{FIELDS}}}}}");
                let body = self
                    .send(
                        "business_discovery",
                        self.client.get(self.url(ig_user)).query(&[("fields", fields.as_str())]),
                    )
                    .await?;
                body.pointer("/business_discovery/media/data/0").cloned()
            }
            None => {
                let body = self
                    .send(
                        "latest media",
                        self.client
                            .get(self.url(&format!("{ig_user}/media")))
                            .query(&[("fields", FIELDS), ("limit", "1")]),
                    )
                    .await?;
                body.pointer("/data/0").cloned()
            }
        };

        Ok(node.as_ref().and_then(LatestMedia::from_graph))
    }

    /// Whether the account's latest post carries `caption`
    async fn find_published_caption(&self, caption: &str) -> Option<LatestMedia> {
        match self.latest_media(None).await {
            Ok(Some(media)) if media.caption.as_deref().map(str::trim) == Some(caption.trim()) => {
                Some(media)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Fallback verification lookup failed: {}", e);
                None
            }
        }
    }

    /// Create, publish and decorate a post
    ///
    /// A rate-limited publish is verified against the latest post of the
    /// account: a matching caption counts as published.
    pub async fn publish(&self, plan: &PublishPlan) -> Result<PublishOutcome, InstagramError> {
        self.credentials()?;
        let creation_id = self.create_container(plan).await?;
        tracing::info!(
            "Created container {} ({} image(s))",
            creation_id,
            plan.image_urls.len()
        );

        let mut outcome = PublishOutcome {
            creation_id: creation_id.clone(),
            media_id: None,
            permalink: None,
            published: false,
            verified_by_fallback: false,
            collaborators: plan.collaborators.clone(),
            collaborators_status: None,
        };

        if plan.dry_run {
            return Ok(outcome);
        }

        match self.publish_container(&creation_id).await {
            Ok(media_id) => {
                outcome.permalink = self.permalink(&media_id).await;
                outcome.media_id = Some(media_id);
            }
            Err(err) if err.is_rate_limited() => {
                tracing::warn!("Publish rate limited, checking latest post of the account");
                let media = self.find_published_caption(&plan.caption).await.ok_or(err)?;
                tracing::info!("Publish verified by fallback: {}", media.id);
                outcome.permalink = match media.permalink {
                    Some(link) => Some(link),
                    None => self.permalink(&media.id).await,
                };
                outcome.media_id = Some(media.id);
                outcome.verified_by_fallback = true;
            }
            Err(err) => return Err(err),
        }
        outcome.published = true;

        if let (Some(media_id), false) = (&outcome.media_id, plan.collaborators.is_empty()) {
            outcome.collaborators_status = self.ensure_collaborators(media_id, &plan.collaborators).await;
        }

        Ok(outcome)
    }
}
