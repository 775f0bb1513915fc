//! HTML fixtures for tests.
//!
//! Builders for the page shapes the crawler sees in the wild: category
//! listings with ant-design pagination, contest detail pages, and the
//! two results-page layouts the prior-art fallback tolerates.

use std::fmt::Write;

/// Builder for a listing page.
pub struct ListingFixture {
    cards: Vec<Card>,
    next_page: Option<usize>,
    container: bool,
    pagination: bool,
}

struct Card {
    contest_href: String,
    title: String,
    troll_href: Option<String>,
}

impl Default for ListingFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingFixture {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            next_page: None,
            container: true,
            pagination: true,
        }
    }

    /// A page with no listing container at all.
    pub fn without_container() -> Self {
        Self {
            container: false,
            ..Self::new()
        }
    }

    /// Add a contest card without a patent-reference link.
    pub fn card(mut self, contest_href: &str, title: &str) -> Self {
        self.cards.push(Card {
            contest_href: contest_href.to_string(),
            title: title.to_string(),
            troll_href: None,
        });
        self
    }

    /// Add a contest card followed by its patent-reference link.
    pub fn card_with_troll(mut self, contest_href: &str, title: &str, troll_href: &str) -> Self {
        self.cards.push(Card {
            contest_href: contest_href.to_string(),
            title: title.to_string(),
            troll_href: Some(troll_href.to_string()),
        });
        self
    }

    /// Advertise `page` as the next page: emits its ordinal control and
    /// an enabled next affordance. Without this the next control renders
    /// disabled, the way the live site marks its last page.
    pub fn with_next_page(mut self, page: usize) -> Self {
        self.next_page = Some(page);
        self
    }

    /// Omit the pagination block entirely.
    pub fn without_pagination(mut self) -> Self {
        self.pagination = false;
        self
    }

    pub fn build(&self) -> String {
        let mut html = String::from("<html><body>");
        if self.container {
            html.push_str("<ul class=\"ant-list-items\">");
            for card in &self.cards {
                let _ = write!(
                    html,
                    "<li class=\"ant-list-item\"><a href=\"{}\">{}</a>",
                    card.contest_href, card.title
                );
                if let Some(troll) = &card.troll_href {
                    let _ = write!(html, " <a href=\"{}\">US Patent</a>", troll);
                }
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }
        if self.pagination {
            html.push_str("<ul class=\"ant-pagination\">");
            match self.next_page {
                Some(page) => {
                    let _ = write!(
                        html,
                        "<li title=\"{page}\"><a>{page}</a></li>\
                         <li class=\"ant-pagination-next\" title=\"Next Page\"><button>&gt;</button></li>"
                    );
                }
                None => {
                    html.push_str(
                        "<li class=\"ant-pagination-next\" title=\"Next Page\" \
                         aria-disabled=\"true\"><button>&gt;</button></li>",
                    );
                }
            }
            html.push_str("</ul>");
        }
        html.push_str("</body></html>");
        html
    }
}

/// Builder for a contest detail page.
#[derive(Default)]
pub struct DetailFixture {
    title: Option<String>,
    troll_link: Option<(String, String)>,
    award: Option<String>,
    results_href: Option<String>,
    patent_refs: Vec<String>,
}

impl DetailFixture {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    /// A detail page with no top-level heading.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Add the patent-reference link naming the challenged patent.
    pub fn with_troll_patent(mut self, href: &str, text: &str) -> Self {
        self.troll_link = Some((href.to_string(), text.to_string()));
        self
    }

    /// Add the award label block and its value block.
    pub fn with_award(mut self, amount: &str) -> Self {
        self.award = Some(amount.to_string());
        self
    }

    /// Add the winning-prior-art marker with its sibling download link.
    pub fn with_results_link(mut self, href: &str) -> Self {
        self.results_href = Some(href.to_string());
        self
    }

    /// Add a patent-reference link in the page body, the shape the
    /// finished layout lists submissions in.
    pub fn with_patent_reference(mut self, href: &str) -> Self {
        self.patent_refs.push(href.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut html = String::from("<html><body>");
        if let Some(title) = &self.title {
            let _ = write!(html, "<h1>{title}</h1>");
        }
        if let Some((href, text)) = &self.troll_link {
            let _ = write!(html, "<p><a href=\"{href}\">{text}</a></p>");
        }
        if let Some(amount) = &self.award {
            let _ = write!(
                html,
                "<div class=\"meta\"><div>Award Amount</div><div>{amount}</div></div>"
            );
        }
        if let Some(href) = &self.results_href {
            let _ = write!(
                html,
                "<p><span>DOWNLOAD WINNING PRIOR ART HERE:</span>\
                 <a href=\"{href}\">Download</a></p>"
            );
        }
        for href in &self.patent_refs {
            let id = href.rsplit('/').next().unwrap_or_default();
            let _ = write!(html, "<p><a href=\"{href}\">{id}</a></p>");
        }
        html.push_str("</body></html>");
        html
    }
}

/// Results page in the marker layout.
pub fn results_with_marker(ids: &[&str]) -> String {
    format!(
        "<html><body><p><strong>Winning Submissions:</strong> {}</p></body></html>",
        ids.join("; ")
    )
}

/// Results page in the structured-list layout.
pub fn results_with_list(ids: &[&str]) -> String {
    let items: String = ids
        .iter()
        .map(|id| format!("<li><a href=\"#\">{id}</a></li>"))
        .collect();
    format!("<html><body><ul data-rte-list=\"default\">{items}</ul></body></html>")
}

/// Results page carrying both layouts with different content, for
/// asserting which one wins.
pub fn results_with_both(marker_ids: &[&str], list_ids: &[&str]) -> String {
    let items: String = list_ids
        .iter()
        .map(|id| format!("<li><a href=\"#\">{id}</a></li>"))
        .collect();
    format!(
        "<html><body>\
         <p>Winning Submissions: {}</p>\
         <ul data-rte-list=\"default\">{items}</ul>\
         </body></html>",
        marker_ids.join("; ")
    )
}
