use crate::utils::error::Result;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use url::Url;

fn template_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_.]+)\}").expect("static template regex"))
}

/// 展開 `{var}`，回傳展開結果與用掉的變數名稱
///
/// 變數先從 `params` 找，再交給 `fallback`（通常是目前資源的欄位）。
/// 找不到的變數展開成空字串。
pub fn expand<F>(
    template: &str,
    params: &BTreeMap<String, String>,
    fallback: F,
) -> (String, HashSet<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut consumed = HashSet::new();

    let expanded = template_regex().replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        if let Some(value) = params.get(name) {
            consumed.insert(name.to_string());
            return urlencoding::encode(value).into_owned();
        }
        match fallback(name) {
            Some(value) => urlencoding::encode(&value).into_owned(),
            None => {
                tracing::debug!("URI template variable '{}' left empty", name);
                String::new()
            }
        }
    });

    (expanded.into_owned(), consumed)
}

/// 把 link href 解析成完整 URL：展開、相對路徑接上 base、剩下的參數放進 query
pub fn resolve<F>(
    base_url: &str,
    href: &str,
    params: &BTreeMap<String, String>,
    fallback: F,
) -> Result<Url>
where
    F: Fn(&str) -> Option<String>,
{
    let (expanded, consumed) = expand(href, params, fallback);
    let base = Url::parse(base_url)?;
    let mut url = base.join(&expanded)?;

    let leftovers: Vec<(&String, &String)> = params
        .iter()
        .filter(|(key, _)| !consumed.contains(*key))
        .collect();

    if !leftovers.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in leftovers {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}
