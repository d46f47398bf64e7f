// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::SiteCheckError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::collections::HashMap;

/// 标准站点地图命名空间
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSitemap {
    /// `<loc>` 中的URL，按文档顺序
    pub locations: Vec<String>,
    /// 根元素声明的命名空间
    pub declared_namespace: Option<String>,
    /// 实际命中的命名空间（`None` 表示无命名空间）
    pub matched_namespace: Option<String>,
}

/// 打开的元素
struct OpenElement {
    namespace: Option<String>,
    local_name: String,
    /// 对 `url` 元素：是否已取到第一个 `loc`
    loc_taken: bool,
}

fn namespace_key(resolved: &ResolveResult) -> Result<Option<String>, SiteCheckError> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(String::from_utf8_lossy(uri).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SiteCheckError::Parse(format!(
            "unbound prefix '{}'",
            String::from_utf8_lossy(prefix)
        ))),
    }
}

/// 解析站点地图XML
///
/// 依次尝试根元素声明的命名空间、标准站点地图命名空间、无命名空间，
/// 取第一个至少得到一个URL的策略，不合并不同策略的结果。
///
/// # 参数
///
/// * `xml` - 站点地图文档
///
/// # 返回值
///
/// * `Ok(ParsedSitemap)` - 解析结果（可能为空）
/// * `Err(SiteCheckError::Parse)` - XML 格式错误
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap, SiteCheckError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root_seen = false;
    let mut declared_namespace = None;
    // namespace -> locations found under <url><loc> in that namespace
    let mut groups: HashMap<Option<String>, Vec<String>> = HashMap::new();
    let mut capture: Option<(Option<String>, String)> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| SiteCheckError::Parse(e.to_string()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let namespace = namespace_key(&resolved)?;
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                if !root_seen {
                    root_seen = true;
                    declared_namespace = namespace.clone();
                } else if stack.is_empty() {
                    return Err(SiteCheckError::Parse(
                        "multiple root elements".to_string(),
                    ));
                }

                if local_name == "loc" && !is_empty {
                    if let Some(parent) = stack.last_mut() {
                        if parent.local_name == "url"
                            && parent.namespace == namespace
                            && !parent.loc_taken
                        {
                            parent.loc_taken = true;
                            capture = Some((namespace.clone(), String::new()));
                        }
                    }
                }

                if !is_empty {
                    stack.push(OpenElement {
                        namespace,
                        local_name,
                        loc_taken: false,
                    });
                }
            }
            Event::Text(ref e) => {
                if let Some((_, buffer)) = capture.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| SiteCheckError::Parse(err.to_string()))?;
                    buffer.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some((_, buffer)) = capture.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                if let Some(element) = closed {
                    if element.local_name == "loc" {
                        if let Some((namespace, buffer)) = capture.take() {
                            let location = buffer.trim();
                            if !location.is_empty() {
                                groups
                                    .entry(namespace)
                                    .or_default()
                                    .push(location.to_string());
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(SiteCheckError::Parse("no element found".to_string()));
    }
    if !stack.is_empty() {
        return Err(SiteCheckError::Parse(
            "unexpected end of document".to_string(),
        ));
    }

    let mut strategies: Vec<Option<String>> = Vec::with_capacity(3);
    if declared_namespace.is_some() {
        strategies.push(declared_namespace.clone());
    }
    strategies.push(Some(SITEMAP_NAMESPACE.to_string()));
    strategies.push(None);

    for namespace in strategies {
        if let Some(locations) = groups.remove(&namespace) {
            if !locations.is_empty() {
                return Ok(ParsedSitemap {
                    locations,
                    declared_namespace,
                    matched_namespace: namespace,
                });
            }
        }
    }

    Ok(ParsedSitemap {
        locations: Vec::new(),
        declared_namespace,
        matched_namespace: None,
    })
}
