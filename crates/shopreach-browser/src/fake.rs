//! In-memory [`PageDriver`] for tests.
//!
//! Pages are keyed by URL. Each page is a tree of nodes; a child is attached
//! under the exact [`Locator`] that should find it, so tests describe pages
//! in terms of the same locators the code under test uses. Every driver call
//! is recorded as a [`FakeEvent`].

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::locator::Locator;

/// Handle to a node of a fake page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeElement(usize);

/// Content of one fake node.
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    text: String,
    attrs: HashMap<String, String>,
    click_fails: bool,
    keys_fail: bool,
}

impl FakeNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Clicking this node returns a backend error.
    #[must_use]
    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }

    /// Typing or pasting into this node returns a backend error.
    #[must_use]
    pub fn failing_keys(mut self) -> Self {
        self.keys_fail = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Navigate(String),
    Click(FakeElement),
    SendKeys(FakeElement, String),
    Paste(FakeElement, String),
}

#[derive(Debug)]
struct NodeData {
    node: FakeNode,
    children: Vec<(Locator, usize)>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<NodeData>,
    pages: HashMap<String, usize>,
    redirects: HashMap<String, String>,
    broken_urls: HashSet<String>,
    current: Option<String>,
    events: Vec<FakeEvent>,
}

impl Inner {
    fn push_node(&mut self, node: FakeNode) -> usize {
        self.nodes.push(NodeData {
            node,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn node(&self, element: FakeElement) -> Result<&FakeNode, DriverError> {
        self.nodes
            .get(element.0)
            .map(|data| &data.node)
            .ok_or_else(|| DriverError::Backend(format!("stale element {}", element.0)))
    }
}

/// Scriptable in-memory browser tab.
#[derive(Debug, Default)]
pub struct FakeDriver {
    inner: Mutex<Inner>,
}

impl FakeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Root of the page served at `url`, created empty on first use.
    pub fn page(&self, url: &str) -> FakeElement {
        let mut inner = self.lock();
        if let Some(&root) = inner.pages.get(url) {
            return FakeElement(root);
        }
        let root = inner.push_node(FakeNode::new());
        inner.pages.insert(url.to_owned(), root);
        FakeElement(root)
    }

    /// Attaches `node` under `parent`, reachable through `locator`.
    pub fn add(&self, parent: FakeElement, locator: &Locator, node: FakeNode) -> FakeElement {
        let mut inner = self.lock();
        let id = inner.push_node(node);
        inner.nodes[parent.0].children.push((locator.clone(), id));
        FakeElement(id)
    }

    /// After navigating to `from`, `current_url` reports `to`.
    pub fn redirect(&self, from: &str, to: &str) {
        self.lock().redirects.insert(from.to_owned(), to.to_owned());
    }

    /// Navigating to `url` fails.
    pub fn break_url(&self, url: &str) {
        self.lock().broken_urls.insert(url.to_owned());
    }

    #[must_use]
    pub fn events(&self) -> Vec<FakeEvent> {
        self.lock().events.clone()
    }

    /// URLs navigated to, in order.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                FakeEvent::Navigate(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut inner = self.lock();
        inner.events.push(FakeEvent::Navigate(url.to_owned()));
        if inner.broken_urls.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_owned(),
                reason: "connection reset".to_owned(),
            });
        }
        inner.current = Some(url.to_owned());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let inner = self.lock();
        let current = inner
            .current
            .clone()
            .ok_or_else(|| DriverError::Backend("no page loaded".to_owned()))?;
        Ok(inner.redirects.get(&current).cloned().unwrap_or(current))
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&FakeElement>,
    ) -> Result<Vec<FakeElement>, DriverError> {
        let inner = self.lock();
        let parent = match scope {
            Some(element) => element.0,
            None => {
                let current = inner
                    .current
                    .as_ref()
                    .ok_or_else(|| DriverError::Backend("no page loaded".to_owned()))?;
                match inner.pages.get(current) {
                    Some(&root) => root,
                    None => return Ok(Vec::new()),
                }
            }
        };
        let data = inner
            .nodes
            .get(parent)
            .ok_or_else(|| DriverError::Backend(format!("stale element {parent}")))?;
        Ok(data
            .children
            .iter()
            .filter(|(l, _)| l == locator)
            .map(|(_, id)| FakeElement(*id))
            .collect())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, DriverError> {
        Ok(self.lock().node(*element)?.text.clone())
    }

    async fn attr(&self, element: &FakeElement, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.lock().node(*element)?.attrs.get(name).cloned())
    }

    async fn click(&self, element: &FakeElement) -> Result<(), DriverError> {
        let mut inner = self.lock();
        inner.events.push(FakeEvent::Click(*element));
        if inner.node(*element)?.click_fails {
            return Err(DriverError::Backend("element click intercepted".to_owned()));
        }
        Ok(())
    }

    async fn send_keys(&self, element: &FakeElement, keys: &str) -> Result<(), DriverError> {
        let mut inner = self.lock();
        inner
            .events
            .push(FakeEvent::SendKeys(*element, keys.to_owned()));
        if inner.node(*element)?.keys_fail {
            return Err(DriverError::Backend("element not interactable".to_owned()));
        }
        Ok(())
    }

    async fn paste(&self, element: &FakeElement, text: &str) -> Result<(), DriverError> {
        let mut inner = self.lock();
        inner.events.push(FakeEvent::Paste(*element, text.to_owned()));
        if inner.node(*element)?.keys_fail {
            return Err(DriverError::Backend("element not interactable".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_children_by_exact_locator_on_current_page() {
        let driver = FakeDriver::new();
        let root = driver.page("https://shop.test/a");
        let links = Locator::xpath("//a");
        let first = driver.add(root, &links, FakeNode::text("one").with_attr("href", "/1"));
        driver.add(root, &links, FakeNode::text("two"));
        driver.add(root, &Locator::css("a"), FakeNode::text("other locator"));

        driver.navigate("https://shop.test/a").await.unwrap();
        let found = driver.find_all(&links, None).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], first);
        assert_eq!(driver.text(&found[1]).await.unwrap(), "two");
        assert_eq!(
            driver.attr(&first, "href").await.unwrap().as_deref(),
            Some("/1")
        );
        assert!(driver.attr(&first, "src").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_reports_not_found_for_missing_element() {
        let driver = FakeDriver::new();
        driver.navigate("https://shop.test/empty").await.unwrap();
        let err = driver.find(&Locator::id("x"), None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn scoped_search_only_sees_descendants_of_scope() {
        let driver = FakeDriver::new();
        let root = driver.page("p");
        let card = driver.add(root, &Locator::css(".card"), FakeNode::new());
        let title = Locator::css(".title");
        driver.add(card, &title, FakeNode::text("inside"));
        driver.add(root, &title, FakeNode::text("outside"));
        driver.navigate("p").await.unwrap();

        let found = driver.find_all(&title, Some(&card)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(driver.text(&found[0]).await.unwrap(), "inside");
    }

    #[tokio::test]
    async fn records_events_and_injected_failures() {
        let driver = FakeDriver::new();
        driver.break_url("https://down.test");
        let root = driver.page("ok");
        let button = driver.add(root, &Locator::tag("button"), FakeNode::new().failing_click());

        assert!(driver.navigate("https://down.test").await.is_err());
        driver.navigate("ok").await.unwrap();
        assert!(driver.click(&button).await.is_err());

        assert_eq!(
            driver.events(),
            vec![
                FakeEvent::Navigate("https://down.test".to_owned()),
                FakeEvent::Navigate("ok".to_owned()),
                FakeEvent::Click(button),
            ]
        );
    }

    #[tokio::test]
    async fn current_url_follows_redirects() {
        let driver = FakeDriver::new();
        driver.redirect("https://shop.test/p?ref=1", "https://shop.test/product/k57");
        driver.navigate("https://shop.test/p?ref=1").await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://shop.test/product/k57"
        );
    }
}
