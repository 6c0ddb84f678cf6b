//! Rendering of operation outcomes into one textual result.
//!
//! Operations return a list of [`Outcome`] values. Records render as
//! indented JSON, paginated streams are drained and flattened into a single
//! JSON array, scalars render as plain text, and empty outcomes are skipped.
//! When nothing renderable was produced, a generic success message is
//! returned so every invocation gives visible feedback.

use crate::constants;
use crate::error::Error;
use crate::utils::to_title_case;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A serializable record with a best-effort text fallback.
pub trait RecordValue: Send {
    /// Serializes the record as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the record cannot be represented as JSON.
    fn to_pretty_json(&self) -> serde_json::Result<String>;

    /// Text used when JSON serialization fails.
    fn fallback_text(&self) -> String;
}

impl<T> RecordValue for T
where
    T: Serialize + fmt::Debug + Send,
{
    fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn fallback_text(&self) -> String {
        format!("{self:#?}")
    }
}

/// One value returned by an operation.
pub enum Outcome {
    /// An absent optional result.
    Empty,
    Record(Box<dyn RecordValue>),
    Stream(PageStream),
    Integer(i64),
    Unsigned(u64),
    Bool(bool),
    Text(String),
}

impl Outcome {
    pub fn record<T: Serialize + fmt::Debug + Send + 'static>(value: T) -> Self {
        Self::Record(Box::new(value))
    }

    /// `None` becomes [`Outcome::Empty`].
    pub fn optional<T: Serialize + fmt::Debug + Send + 'static>(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::record)
    }

    pub fn text(value: impl fmt::Display) -> Self {
        Self::Text(value.to_string())
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Record(_) => "record",
            Self::Stream(_) => "stream",
            Self::Integer(_) | Self::Unsigned(_) => "integer",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "Integer({v})"),
            Self::Unsigned(v) => write!(f, "Unsigned({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Text(v) => write!(f, "Text({v:?})"),
            other => write!(f, "{}", other.label()),
        }
    }
}

type Page = anyhow::Result<Value>;

/// Producer side of a paginated stream.
#[derive(Debug, Clone)]
pub struct PageSender {
    tx: mpsc::Sender<Page>,
}

impl PageSender {
    /// Sends one page, waiting while the buffer is full.
    ///
    /// Returns `false` once the consumer has gone away; producers should stop.
    pub async fn send(&self, page: Value) -> bool {
        self.tx.send(Ok(page)).await.is_ok()
    }

    /// Reports a failed page fetch; the drain stops with this error.
    pub async fn fail(&self, err: anyhow::Error) -> bool {
        self.tx.send(Err(err)).await.is_ok()
    }
}

/// Consumer side of a paginated stream: pages arrive until every sender is dropped.
#[derive(Debug)]
pub struct PageStream {
    rx: mpsc::Receiver<Page>,
    items_field: Option<String>,
}

impl PageStream {
    /// Creates a bounded page channel holding at most `capacity` undelivered pages.
    #[must_use]
    pub fn channel(capacity: usize) -> (PageSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            PageSender { tx },
            Self {
                rx,
                items_field: None,
            },
        )
    }

    /// Names the member of each page object that holds its items.
    #[must_use]
    pub fn items_field(mut self, field: impl Into<String>) -> Self {
        self.items_field = Some(field.into());
        self
    }

    /// Receives every page and flattens their items in receipt order.
    ///
    /// # Errors
    ///
    /// Returns a cancellation error as soon as `cancel` fires, or a remote
    /// error if the producer reported a failed page.
    pub async fn drain(mut self, cancel: &CancellationToken) -> Result<Vec<Value>, Error> {
        let mut items = Vec::new();
        let mut pages = 0_usize;
        loop {
            let page = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.rx.close();
                    warn!(target: "portico::serializer", "stream drain cancelled after {pages} pages");
                    return Err(Error::cancelled("paginated result drain"));
                }
                page = self.rx.recv() => page,
            };
            let Some(page) = page else { break };
            let page = page.map_err(|e| Error::remote(&e))?;
            pages += 1;
            self.flatten_into(page, &mut items);
        }
        debug!(
            target: "portico::serializer",
            "drained {} pages into {} items",
            pages,
            items.len()
        );
        Ok(items)
    }

    fn flatten_into(&self, page: Value, items: &mut Vec<Value>) {
        match page {
            Value::Array(page_items) => items.extend(page_items),
            Value::Object(mut members) => {
                let key = self
                    .items_field
                    .clone()
                    .filter(|field| members.get(field).is_some_and(Value::is_array))
                    .or_else(|| {
                        members
                            .iter()
                            .find(|(_, value)| value.is_array())
                            .map(|(key, _)| key.clone())
                    });
                match key.and_then(|key| members.remove(&key)) {
                    Some(Value::Array(page_items)) => items.extend(page_items),
                    _ => items.push(Value::Object(members)),
                }
            }
            other => items.push(other),
        }
    }
}

/// Renders every outcome of one invocation.
///
/// # Errors
///
/// Returns an error only if a paginated stream fails or is cancelled.
pub async fn render(
    command_name: &str,
    outcomes: Vec<Outcome>,
    cancel: &CancellationToken,
) -> Result<String, Error> {
    let mut rendered = Vec::new();
    for outcome in outcomes {
        if let Some(text) = render_outcome(outcome, cancel).await? {
            rendered.push(text);
        }
    }

    if rendered.is_empty() {
        return Ok(success_message(command_name));
    }
    Ok(rendered.join("\n"))
}

/// The message shown when an operation produced nothing to render.
#[must_use]
pub fn success_message(command_name: &str) -> String {
    format!(
        "{} {}",
        to_title_case(command_name),
        constants::MSG_FINISHED_SUCCESSFULLY
    )
}

async fn render_outcome(
    outcome: Outcome,
    cancel: &CancellationToken,
) -> Result<Option<String>, Error> {
    let text = match outcome {
        Outcome::Empty => return Ok(None),
        Outcome::Record(record) => Some(record.to_pretty_json().unwrap_or_else(|e| {
            warn!(target: "portico::serializer", "falling back to text rendering: {e}");
            record.fallback_text()
        })),
        Outcome::Stream(stream) => {
            let items = stream.drain(cancel).await?;
            Some(serde_json::to_string_pretty(&items)?)
        }
        Outcome::Integer(v) => Some(v.to_string()),
        Outcome::Unsigned(v) => Some(v.to_string()),
        Outcome::Bool(v) => Some(v.to_string()),
        Outcome::Text(v) => Some(v),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_flattens_items_field_or_whole_page() {
        let (tx, stream) = PageStream::channel(4);
        let stream = stream.items_field("resources");
        tokio::spawn(async move {
            tx.send(json!({"resources": [1, 2], "next": "x"})).await;
            tx.send(json!([3])).await;
            tx.send(json!({"id": 4})).await;
        });
        let items = stream.drain(&CancellationToken::new()).await.unwrap();
        assert_eq!(items, vec![json!(1), json!(2), json!(3), json!({"id": 4})]);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_drain() {
        let (tx, stream) = PageStream::channel(1);
        tokio::spawn(async move {
            tx.send(json!([1])).await;
            tx.fail(anyhow::anyhow!("page 2 unavailable")).await;
        });
        let err = stream.drain(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("page 2 unavailable"));
    }

    #[tokio::test]
    async fn test_scalars_and_empty_values() {
        let cancel = CancellationToken::new();
        let out = render(
            "count-users",
            vec![Outcome::Empty, Outcome::Integer(-3), Outcome::Bool(true)],
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(out, "-3\ntrue");
    }
}
