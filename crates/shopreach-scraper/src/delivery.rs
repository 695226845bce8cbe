use shopreach_browser::{Locator, PageDriver};
use shopreach_core::DeliveryRate;

use crate::error::ScraperError;
use crate::extract::ExtractError;

#[derive(Debug, Clone)]
pub struct DeliveryRateLocators {
    /// One province row of the pricing table.
    pub row: Locator,
    /// `"16 - Alger"` cell, inside a row.
    pub province: Locator,
    pub address: Locator,
    pub delay: Locator,
    pub price: Locator,
    pub office_price: Locator,
}

impl Default for DeliveryRateLocators {
    fn default() -> Self {
        Self {
            row: Locator::css(
                "body > div:nth-child(2) > section > div.grid.grid-cols-1.lg\\:grid-cols-3.gap-2.m-2.text-sm > div",
            ),
            province: Locator::xpath(".//div[@class='w-2/5']"),
            address: Locator::xpath(
                ".//div[@class='w-2/5']//div[@class='text-sm text-gray-500'][1]",
            ),
            delay: Locator::xpath(".//div[@class='w-2/5']//div[@class='text-sm text-gray-500'][2]"),
            price: Locator::xpath(".//div[@class='w-1/5 ']"),
            office_price: Locator::xpath(".//div[@class='w-2/5'][2]"),
        }
    }
}

/// Reads every row of the delivery pricing table on the current page. Rows
/// that cannot be read are logged and left out.
///
/// # Errors
///
/// Only a failure to list the rows.
pub async fn extract_delivery_rates<D: PageDriver>(
    driver: &D,
    locators: &DeliveryRateLocators,
) -> Result<Vec<DeliveryRate>, ScraperError> {
    let rows = driver.find_all(&locators.row, None).await?;
    let mut rates = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match read_row(driver, row, locators).await {
            Ok(rate) => rates.push(rate),
            Err(e) => tracing::warn!(row = index, error = %e, "delivery row skipped"),
        }
    }
    tracing::info!(rows = rows.len(), extracted = rates.len(), "delivery rates extracted");
    Ok(rates)
}

async fn cell_text<D: PageDriver>(
    driver: &D,
    row: &D::Element,
    locator: &Locator,
) -> Result<String, ExtractError> {
    let cell = driver.find(locator, Some(row)).await?;
    Ok(driver.text(&cell).await?)
}

async fn read_row<D: PageDriver>(
    driver: &D,
    row: &D::Element,
    locators: &DeliveryRateLocators,
) -> Result<DeliveryRate, ExtractError> {
    let province = cell_text(driver, row, &locators.province).await?;
    let (wilaya_code, wilaya_name) = split_province(&province)?;
    Ok(DeliveryRate {
        wilaya_code,
        wilaya_name,
        address: cell_text(driver, row, &locators.address)
            .await?
            .replace('\u{a0}', " ")
            .trim()
            .to_owned(),
        delay: cell_text(driver, row, &locators.delay).await?.trim().to_owned(),
        price: cell_text(driver, row, &locators.price).await?.trim().to_owned(),
        delivery_office_price: cell_text(driver, row, &locators.office_price)
            .await?
            .trim()
            .to_owned(),
    })
}

/// `"16 - Alger\n..."` → `("16", "Alger")`. The name is the segment between
/// the first and second `"- "`, cut to its first line since the province cell
/// also holds the address lines.
fn split_province(text: &str) -> Result<(String, String), ExtractError> {
    let code = text.split(' ').next().unwrap_or_default();
    let name = text
        .split("- ")
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| ExtractError::Parse {
            what: "province",
            value: text.to_owned(),
        })?;
    let name = name.lines().next().unwrap_or(name).trim();
    if code.is_empty() || name.is_empty() {
        return Err(ExtractError::Parse {
            what: "province",
            value: text.to_owned(),
        });
    }
    Ok((code.to_owned(), name.to_owned()))
}

#[cfg(test)]
mod tests {
    use shopreach_browser::fake::{FakeDriver, FakeNode};

    use super::*;

    const PAGE: &str = "https://shop.test/delivery";

    #[test]
    fn province_splits_into_code_and_first_name_line() {
        assert_eq!(
            split_province("16 - الجزائر\nحي 500 مسكن").unwrap(),
            ("16".to_owned(), "الجزائر".to_owned())
        );
        assert_eq!(
            split_province("16 - Alger - Centre").unwrap(),
            ("16".to_owned(), "Alger".to_owned())
        );
        assert!(split_province("Alger").is_err());
    }

    #[tokio::test]
    async fn extracts_rows_and_skips_broken_ones() {
        let driver = FakeDriver::new();
        let l = DeliveryRateLocators::default();
        let root = driver.page(PAGE);

        let row = driver.add(root, &l.row, FakeNode::new());
        driver.add(row, &l.province, FakeNode::text("31 - Oran"));
        driver.add(row, &l.address, FakeNode::text("Cité\u{a0}Djamel, Bloc 4 "));
        driver.add(row, &l.delay, FakeNode::text(" 24h - 48h "));
        driver.add(row, &l.price, FakeNode::text("600 دج"));
        driver.add(row, &l.office_price, FakeNode::text("400 دج"));

        let broken = driver.add(root, &l.row, FakeNode::new());
        driver.add(broken, &l.province, FakeNode::text("no separator"));

        driver.navigate(PAGE).await.unwrap();
        let rates = extract_delivery_rates(&driver, &l).await.unwrap();

        assert_eq!(
            rates,
            [DeliveryRate {
                wilaya_code: "31".to_owned(),
                wilaya_name: "Oran".to_owned(),
                address: "Cité Djamel, Bloc 4".to_owned(),
                delay: "24h - 48h".to_owned(),
                price: "600 دج".to_owned(),
                delivery_office_price: "400 دج".to_owned(),
            }]
        );
    }
}
