//! Harvesting group cards from a loaded group-search results page.

use std::time::Duration;

use shopreach_browser::{settle, Locator, PageDriver};
use shopreach_core::groups::UNKNOWN_MEMBERS;
use shopreach_core::GroupRecord;
use shopreach_store::RecordStore;

use crate::error::ScraperError;
use crate::extract::ExtractError;

#[derive(Debug, Clone)]
pub struct GroupSearchLocators {
    /// One result card.
    pub card: Locator,
    /// Group name link, inside a card.
    pub name: Locator,
    /// Line carrying "Public · 12K members · ...", inside a card.
    pub info: Locator,
    /// Group link next to the join button, inside a card.
    pub url: Locator,
    /// Any group link, inside a card. Used when `url` finds nothing.
    pub url_fallback: Locator,
}

impl Default for GroupSearchLocators {
    fn default() -> Self {
        Self {
            card: Locator::xpath("//div[@role='article']"),
            name: Locator::xpath(".//a[@aria-hidden='true' and contains(@href, 'groups')]"),
            info: Locator::xpath(".//span[contains(@class, 'x1lliihq')]"),
            url: Locator::xpath(
                ".//div[contains(@class, 'x1q0g3np')]//a[contains(@href, 'groups')]",
            ),
            url_fallback: Locator::xpath(".//a[contains(@href, 'groups')]"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Cards found on the page.
    pub cards: usize,
    pub added: usize,
    /// Cards whose group was already stored (or repeated on the page).
    pub duplicates: usize,
    /// Cards missing a name or a URL.
    pub skipped: usize,
}

/// Member count as displayed (`"12K"`), taken from the first ` · `-separated
/// part mentioning members.
#[must_use]
pub fn parse_member_count(info: &str) -> Option<String> {
    info.split(" · ")
        .find(|part| part.to_lowercase().contains("members"))
        .and_then(|part| part.split_whitespace().next())
        .map(str::to_owned)
}

/// Extracts every group card on the current page and merges the new groups
/// into `store`, keyed by URL. The page must already be loaded; `settle` is
/// waited first so late cards have rendered.
///
/// # Errors
///
/// Listing the cards or writing the store. Individual card failures are
/// logged and counted in [`DiscoveryReport::skipped`].
pub async fn discover_groups<D: PageDriver>(
    driver: &D,
    store: &RecordStore<GroupRecord>,
    locators: &GroupSearchLocators,
    settle_for: Duration,
) -> Result<DiscoveryReport, ScraperError> {
    settle(settle_for).await;

    let cards = driver.find_all(&locators.card, None).await?;
    let mut report = DiscoveryReport {
        cards: cards.len(),
        ..DiscoveryReport::default()
    };

    let mut candidates = Vec::with_capacity(cards.len());
    for (index, card) in cards.iter().enumerate() {
        match read_card(driver, card, locators).await {
            Ok(group) => candidates.push(group),
            Err(e) => {
                tracing::warn!(card = index, error = %e, "group card skipped");
                report.skipped += 1;
            }
        }
    }

    let merge = store.merge_new(candidates)?;
    report.added = merge.added;
    report.duplicates = merge.duplicates;
    tracing::info!(
        cards = report.cards,
        added = report.added,
        duplicates = report.duplicates,
        skipped = report.skipped,
        total = merge.total,
        "group discovery finished"
    );
    Ok(report)
}

async fn read_card<D: PageDriver>(
    driver: &D,
    card: &D::Element,
    locators: &GroupSearchLocators,
) -> Result<GroupRecord, ExtractError> {
    let name_el = driver.find(&locators.name, Some(card)).await?;
    let name = driver.text(&name_el).await?.trim().to_owned();
    if name.is_empty() {
        return Err(ExtractError::Missing("group name"));
    }

    let members = match driver.find(&locators.info, Some(card)).await {
        Ok(info) => driver
            .text(&info)
            .await
            .ok()
            .and_then(|text| parse_member_count(&text)),
        Err(e) => {
            tracing::debug!(name = %name, error = %e, "member count not shown");
            None
        }
    }
    .unwrap_or_else(|| UNKNOWN_MEMBERS.to_owned());

    let url = group_url(driver, card, locators).await?;
    Ok(GroupRecord::discovered(name, url, members))
}

async fn group_url<D: PageDriver>(
    driver: &D,
    card: &D::Element,
    locators: &GroupSearchLocators,
) -> Result<String, ExtractError> {
    let link = match driver.find(&locators.url, Some(card)).await {
        Ok(link) => link,
        Err(e) if e.is_not_found() => driver.find(&locators.url_fallback, Some(card)).await?,
        Err(e) => return Err(e.into()),
    };
    let href = driver
        .attr(&link, "href")
        .await?
        .ok_or(ExtractError::Missing("group link href"))?;
    let url = href.split('?').next().unwrap_or_default().to_owned();
    if url.is_empty() {
        return Err(ExtractError::Missing("group url"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use shopreach_browser::fake::{FakeDriver, FakeElement, FakeNode};
    use shopreach_core::PostStatus;

    use super::*;

    const RESULTS: &str = "https://social.test/search/groups?q=shop";

    fn card(driver: &FakeDriver, l: &GroupSearchLocators, name: &str) -> FakeElement {
        let root = driver.page(RESULTS);
        let card = driver.add(root, &l.card, FakeNode::new());
        driver.add(card, &l.name, FakeNode::text(name));
        card
    }

    #[test]
    fn member_count_is_first_word_of_members_part() {
        assert_eq!(
            parse_member_count("Public · 12K members · 10+ posts a day").as_deref(),
            Some("12K")
        );
        assert_eq!(parse_member_count("Public · 3 Members").as_deref(), Some("3"));
        assert!(parse_member_count("Private · 10 posts a day").is_none());
    }

    #[tokio::test]
    async fn extracts_cards_and_merges_by_url() {
        let driver = FakeDriver::new();
        let l = GroupSearchLocators::default();

        let first = card(&driver, &l, " بيع وشراء الجزائر ");
        driver.add(first, &l.info, FakeNode::text("Public · 120K members · 50 posts a day"));
        driver.add(
            first,
            &l.url,
            FakeNode::new().with_attr("href", "https://social.test/groups/dz.market/?ref=search"),
        );

        let second = card(&driver, &l, "Oran deals");
        driver.add(
            second,
            &l.url_fallback,
            FakeNode::new().with_attr("href", "https://social.test/groups/oran"),
        );

        let nameless = driver.add(driver.page(RESULTS), &l.card, FakeNode::new());
        driver.add(
            nameless,
            &l.url,
            FakeNode::new().with_attr("href", "https://social.test/groups/x"),
        );

        let no_url = card(&driver, &l, "Linkless");
        driver.add(no_url, &l.info, FakeNode::text("Public · 5 members"));

        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::at(dir.path().join("groups.json"));
        store
            .save(&[GroupRecord::discovered(
                "Oran deals (old name)",
                "https://social.test/groups/oran",
                "900",
            )])
            .unwrap();

        driver.navigate(RESULTS).await.unwrap();
        let report = discover_groups(&driver, &store, &l, Duration::ZERO).await.unwrap();

        assert_eq!(
            report,
            DiscoveryReport {
                cards: 4,
                added: 1,
                duplicates: 1,
                skipped: 2,
            }
        );
        let groups = store.load();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Oran deals (old name)");
        let added = &groups[1];
        assert_eq!(added.name, "بيع وشراء الجزائر");
        assert_eq!(added.url, "https://social.test/groups/dz.market/");
        assert_eq!(added.members, "120K");
        assert_eq!(added.timestamp, 0);
        assert!(added.sendable);
        assert_eq!(added.post_status, PostStatus::None);
    }

    #[tokio::test]
    async fn missing_member_line_falls_back_to_unknown() {
        let driver = FakeDriver::new();
        let l = GroupSearchLocators::default();
        let c = card(&driver, &l, "Quiet group");
        driver.add(
            c,
            &l.url,
            FakeNode::new().with_attr("href", "https://social.test/groups/quiet"),
        );

        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::at(dir.path().join("groups.json"));
        driver.navigate(RESULTS).await.unwrap();
        discover_groups(&driver, &store, &l, Duration::ZERO).await.unwrap();

        assert_eq!(store.load()[0].members, UNKNOWN_MEMBERS);
    }

    #[tokio::test]
    async fn page_without_cards_leaves_store_untouched() {
        let driver = FakeDriver::new();
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::<GroupRecord>::at(dir.path().join("groups.json"));
        driver.navigate(RESULTS).await.unwrap();

        let locators = GroupSearchLocators::default();
        let report = discover_groups(&driver, &store, &locators, Duration::ZERO).await.unwrap();

        assert_eq!(report, DiscoveryReport::default());
        assert!(!store.path().exists());
    }
}
