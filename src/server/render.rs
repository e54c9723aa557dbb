//! Minimal HTML views for search results and page details

use crate::search::{SearchHit, SearchQuery};
use crate::server::handlers::PageDetail;
use std::fmt::Write;

/// Escapes text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Encodes a URL as a single path segment
pub fn encode_segment(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_rank(rank: Option<f64>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_else(|| "none".to_string())
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Search form plus result list
pub fn search_page(partition: &str, query: &SearchQuery, hits: &[SearchHit]) -> String {
    let name = capitalize(partition);
    let mut body = String::new();

    let _ = write!(
        body,
        "<h1>{name} Search</h1>\n\
         <form action=\"/{partition}\" method=\"GET\">\n\
         <input type=\"text\" name=\"q\" placeholder=\"Search...\" value=\"{q}\">\n\
         <label for=\"boost\">Boost with rank:</label>\n\
         <input type=\"checkbox\" name=\"boost\" value=\"true\"{checked}>\n\
         <label for=\"limit\">Result limit:</label>\n\
         <input type=\"number\" name=\"limit\" min=\"1\" max=\"50\" value=\"{limit}\">\n\
         <button type=\"submit\">Search</button>\n\
         </form>\n<div id=\"results\">\n",
        name = escape_html(&name),
        partition = escape_html(partition),
        q = escape_html(&query.text),
        checked = if query.boost { " checked" } else { "" },
        limit = query.limit,
    );

    let results: Vec<String> = hits
        .iter()
        .map(|hit| {
            format!(
                "<div>\nURL: <a href=\"{url}\">{url}</a><br>\nTitle: {title}<br>\n\
                 Score: {score}<br>\nRank: {rank}<br>\n\
                 <a href=\"/page-data/{partition}/{encoded}\">View data</a>\n</div>",
                url = escape_html(&hit.url),
                title = escape_html(&hit.title),
                score = hit.score,
                rank = format_rank(hit.rank),
                partition = escape_html(partition),
                encoded = encode_segment(&hit.url),
            )
        })
        .collect();
    body.push_str(&results.join("\n<hr>\n"));
    body.push_str("\n</div>");

    document(&format!("{} Search Engine", name), &body)
}

/// Page-detail view
pub fn page_detail(detail: &PageDetail) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<div><strong>URL:</strong> <a href=\"{url}\">{url}</a></div>\n\
         <h1>{title}</h1>\n<div>Rank: {rank}</div>\n<h2>Word Frequency</h2>\n",
        url = escape_html(&detail.url),
        title = escape_html(&detail.title),
        rank = format_rank(detail.rank),
    );
    for (word, count) in &detail.word_frequency {
        let _ = writeln!(body, "<div>{}: {} times</div>", escape_html(word), count);
    }

    for (heading, links) in [
        ("Incoming Links", &detail.incoming_links),
        ("Outgoing Links", &detail.outgoing_links),
    ] {
        let _ = writeln!(body, "<h2>{}</h2>", heading);
        for link in links {
            let link = escape_html(link);
            let _ = writeln!(body, "<div><a href=\"{0}\">{0}</a></div>", link);
        }
    }

    document(&format!("Page Data for {}", detail.title), &body)
}
