use super::{
    catalog::{Catalog, CatalogEntry},
    selection::Selection,
};
use crate::{common::markup::escape, Config, Widget};

pub const HEADER_FOUND: &str = "Messages extracted:";
pub const HEADER_NONE: &str = "No codes recognized in image";

// Message list
//------------------------------------------------------------------------------

/// Renders the catalog as a checkbox list. The header reflects the most
/// recent pass; checked state comes from `selection`.
pub fn render_messages(cfg: &Config, catalog: &Catalog, selection: &Selection) -> String {
    let mut res = format!("<div class='{}'>", cfg.class_name("msglist"));
    res.push_str(if catalog.last_pass() > 0 { HEADER_FOUND } else { HEADER_NONE });
    for (i, entry) in catalog.entries().iter().enumerate() {
        res.push_str(&render_entry(cfg, entry, i, selection.is_checked(i)));
    }
    res.push_str("</div>");
    res
}

fn slot_class(cfg: &Config, entry: &CatalogEntry) -> String {
    if entry.stale {
        cfg.class_name("stale")
    } else {
        cfg.class_name(&format!("c{}", entry.slot))
    }
}

fn render_entry(cfg: &Config, entry: &CatalogEntry, i: usize, checked: bool) -> String {
    let c = slot_class(cfg, entry);
    let check_id = cfg.full_id(Widget::Reader, &format!("check{i}"));
    let msg_id = cfg.full_id(Widget::Reader, &format!("msg{i}"));
    let text = escape(&entry.text);

    let mut res = format!(
        "<div class='{} {} {c}'>",
        cfg.class_name("extracted"),
        cfg.class_name("msg")
    );
    res.push_str(&format!(
        "<input type=\"checkbox\" id='{check_id}'{} data-index=\"{i}\" class='{} {c}'/>",
        if checked { " checked" } else { "" },
        cfg.class_name("check")
    ));
    res.push_str(&format!(
        "<span id='{msg_id}' data-index=\"{i}\" class='{} {c}'>{text}</span>",
        cfg.class_name("msg")
    ));
    if entry.is_url() {
        res.push_str(&format!(
            " <a href='{text}' class='{} {c}' target=_blank></a>",
            cfg.class_name("target")
        ));
    }
    res.push_str("</div>");
    res
}

#[cfg(test)]
mod messages_tests {
    use super::{render_messages, HEADER_FOUND, HEADER_NONE};
    use crate::{
        reader::{catalog::Catalog, detector::Detection, geometry::Point, selection::Selection},
        Config,
    };

    fn det(text: &str) -> Detection {
        Detection::new([Point::default(); 4], text)
    }

    fn render(catalog: &Catalog) -> String {
        let mut sel = Selection::new(false);
        sel.reset(catalog.len(), catalog.first_fresh());
        render_messages(&Config::default(), catalog, &sel)
    }

    #[test]
    fn test_url_link() {
        let mut cat = Catalog::new();
        cat.reconcile(&[det("https://example.com"), det("hello world")]);
        let html = render(&cat);
        assert!(html.starts_with(&format!("<div class='qrio-msglist'>{HEADER_FOUND}")));
        assert!(html.contains("<a href='https://example.com' class='qrio-target qrio-c0' target=_blank></a>"));
        assert_eq!(html.matches("<a href").count(), 1);
    }

    #[test]
    fn test_auto_check_first_fresh() {
        let mut cat = Catalog::new();
        cat.reconcile(&[det("A")]);
        cat.reconcile(&[det("B"), det("C")]);
        let html = render(&cat);
        assert!(html.contains("id='qrio-reader-check0' data-index=\"0\" class='qrio-check qrio-stale'"));
        assert!(html.contains("id='qrio-reader-check1' checked data-index=\"1\""));
        assert!(html.contains("id='qrio-reader-check2' data-index=\"2\""));
        assert_eq!(html.matches(" checked").count(), 1);
    }

    #[test]
    fn test_no_codes() {
        let mut cat = Catalog::new();
        cat.reconcile(&[det("A")]);
        cat.reconcile(&[]);
        let html = render(&cat);
        assert!(html.starts_with(&format!("<div class='qrio-msglist'>{HEADER_NONE}")));
        assert!(html.contains("<span id='qrio-reader-msg0' data-index=\"0\" class='qrio-msg qrio-stale'>A</span>"));
        assert!(!html.contains(" checked"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let mut cat = Catalog::new();
        cat.reconcile(&[det("<b>x</b>")]);
        assert!(render(&cat).contains(">&lt;b&gt;x&lt;/b&gt;</span>"));
    }
}
