//! Citation dialog parsing.

use scraper::{Html, Selector};

use super::element_text;
use crate::models::{Citation, CitationData, ExportLink};

/// Parse the citation dialog returned for `output=cite` requests.
///
/// Rows of `#gs_citt` become [`Citation`]s and anchors inside `#gs_citi`
/// become [`ExportLink`]s. Rows or anchors whose label is empty after
/// stripping markup are dropped; a missing table or container simply yields
/// an empty list.
pub fn parse_citation_html(html: &str) -> CitationData {
    let document = Html::parse_document(html);

    CitationData {
        citations: parse_citations(&document),
        exports: parse_exports(&document),
    }
}

fn parse_citations(document: &Html) -> Vec<Citation> {
    let (Ok(table), Ok(row), Ok(th), Ok(td)) = (
        Selector::parse("#gs_citt"),
        Selector::parse("tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let Some(table) = document.select(&table).next() else {
        tracing::debug!("No citation table in response");
        return Vec::new();
    };

    table
        .select(&row)
        .filter_map(|tr| {
            let style = tr.select(&th).next().and_then(|e| element_text(&e))?;
            let text = tr.select(&td).next().and_then(|e| element_text(&e))?;
            Some(Citation::new(style, text))
        })
        .collect()
}

fn parse_exports(document: &Html) -> Vec<ExportLink> {
    let (Ok(container), Ok(anchor)) = (Selector::parse("#gs_citi"), Selector::parse("a")) else {
        return Vec::new();
    };

    let Some(container) = document.select(&container).next() else {
        tracing::debug!("No export links in response");
        return Vec::new();
    };

    container
        .select(&anchor)
        .filter_map(|a| {
            let url = a.value().attr("href")?;
            let format = element_text(&a)?;
            Some(ExportLink::new(format, url))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIALOG_HTML: &str = r#"
<div id="gs_citt"><table><tr><th scope="row" class="gs_cith">MLA</th><td><div tabindex="0" class="gs_citr">Phupattanasilp, Pilaiwan, and Sheau-Ru Tong. "<i>Future Agriculture</i>." <i>IEEE</i>, 2019.</div></td></tr>
<tr><th scope="row" class="gs_cith">APA</th><td><div tabindex="0" class="gs_citr">Phupattanasilp, P., &amp; Tong, S. R. (2019).</div></td></tr>
<tr><th scope="row" class="gs_cith"> </th><td><div class="gs_citr">orphan text</div></td></tr>
<tr><th scope="row" class="gs_cith">Chicago</th><td><div class="gs_citr"><b></b></div></td></tr>
</table></div>
<div id="gs_citi"><a class="gs_citi" href="/scholar.bib?q=info:Xy12:scholar.google.com/&amp;output=citation&amp;hl=en">BibTeX</a> <a class="gs_citi" href="/scholar.enw?q=info:Xy12">EndNote</a> <a class="gs_citi" href="/scholar.ris?q=info:Xy12"> </a></div>
"#;

    #[test]
    fn test_parses_rows_with_markup_stripped() {
        let data = parse_citation_html(DIALOG_HTML);

        assert_eq!(data.citations.len(), 2);
        assert_eq!(data.citations[0].style, "MLA");
        assert_eq!(
            data.citations[0].text,
            "Phupattanasilp, Pilaiwan, and Sheau-Ru Tong. \"Future Agriculture.\" IEEE, 2019."
        );
        assert_eq!(data.citations[1].text, "Phupattanasilp, P., & Tong, S. R. (2019).");
    }

    #[test]
    fn test_drops_empty_rows_and_links() {
        let data = parse_citation_html(DIALOG_HTML);

        assert!(data
            .citations
            .iter()
            .all(|c| !c.style.is_empty() && !c.text.is_empty()));
        assert!(data.style("Chicago").is_none());
        assert_eq!(data.exports.len(), 2);
        assert!(data.exports.iter().all(|e| !e.format.is_empty()));
    }

    #[test]
    fn test_export_url_is_literal_href() {
        let data = parse_citation_html(DIALOG_HTML);

        assert_eq!(data.exports[0].format, "BibTeX");
        assert_eq!(
            data.exports[0].url,
            "/scholar.bib?q=info:Xy12:scholar.google.com/&output=citation&hl=en"
        );
        assert_eq!(data.exports[1].format, "EndNote");
        assert_eq!(data.exports[1].url, "/scholar.enw?q=info:Xy12");
    }

    #[test]
    fn test_missing_table() {
        let html = r#"<div id="gs_citi"><a href="/scholar.bib">BibTeX</a></div>"#;
        let data = parse_citation_html(html);
        assert!(data.citations.is_empty());
        assert_eq!(data.exports.len(), 1);
    }

    #[test]
    fn test_missing_exports() {
        let html = r#"<table id="gs_citt"><tr><th>APA</th><td>Doe, J. (2020).</td></tr></table>"#;
        let data = parse_citation_html(html);
        assert!(data.exports.is_empty());
        assert_eq!(data.citations, vec![Citation::new("APA", "Doe, J. (2020).")]);
    }

    #[test]
    fn test_unrelated_markup() {
        let data = parse_citation_html("<html><body>Please show you're not a robot</body></html>");
        assert!(data.is_empty());
    }
}
