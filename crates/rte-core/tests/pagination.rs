//! Page overflow, underflow, and content conservation across rebalancing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rte_core::{
    ContentIndex, EditorSession, FontMetrics, MultiPageEditor, PageSize, RawIndex, Style,
    StylePatch,
};

fn metrics() -> FontMetrics {
    FontMetrics::fixed(1000.0, 500.0, 750.0, 250.0, 700.0)
}

/// Room for two 27.2px lines and about three 9px glyph advances per line.
fn tiny_editor() -> MultiPageEditor {
    MultiPageEditor::new(
        PageSize {
            width: 28.0,
            height: 60.0,
        },
        metrics(),
    )
}

fn many_lines(n: usize) -> String {
    let mut out = String::new();
    for i in 0..n {
        out.push(char::from(b'a' + (i % 26) as u8));
        out.push('\n');
    }
    out
}

#[test]
fn overflow_spills_onto_new_pages() {
    let mut ed = tiny_editor();
    let text = many_lines(7);
    ed.insert(ContentIndex(0), RawIndex(0), &text, &Style::default(), true);

    assert!(ed.page_count() >= 3);
    assert_eq!(ed.get_all_content(), text);

    // after rebalancing, no page's own layout crosses its boundary
    for (i, page) in ed.pages().iter().enumerate() {
        let layout = page.calculate_layout(0, ContentIndex::ZERO);
        assert!(
            layout.iter().all(|item| item.page == i),
            "page {} still overflows",
            i
        );
    }
}

#[test]
fn every_page_keeps_content_in_order() {
    let mut ed = tiny_editor();
    let text = many_lines(9);
    ed.insert(ContentIndex(0), RawIndex(0), &text, &Style::default(), true);

    let rebuilt: String = ed
        .pages()
        .iter()
        .map(|page| page.content.text())
        .collect();
    assert_eq!(rebuilt, text);

    // pages are numbered consecutively
    for (i, page) in ed.pages().iter().enumerate() {
        assert_eq!(page.page_number, i);
    }
}

#[test]
fn formatting_survives_page_overflow() {
    let mut ed = tiny_editor();
    let text = many_lines(7);
    ed.insert(ContentIndex(0), RawIndex(0), &text, &Style::default(), true);
    assert!(ed.page_count() >= 3);

    // bold the whole document, then force another overflow cycle
    let total = ed.content_len();
    ed.alter_formatting(ContentIndex(0), total, &StylePatch::new().font_weight("700"));

    for item in ed.render_all() {
        if !item.style.is_line_break {
            assert_eq!(item.style.font_weight, "700");
        }
    }
}

#[test]
fn deleting_a_page_pulls_content_back() {
    let mut ed = tiny_editor();
    let text = many_lines(8);
    ed.insert(ContentIndex(0), RawIndex(0), &text, &Style::default(), true);
    let pages_before = ed.page_count();
    assert!(pages_before >= 3);

    // delete everything on page 1
    let page0_content = ed.pages()[0].content_len().get();
    let page0_raw = ed.pages()[0].raw_len().get();
    let page1_content = ed.pages()[1].content_len().get();
    let page1_raw = ed.pages()[1].raw_len().get();
    ed.delete(
        ContentIndex(page0_content),
        ContentIndex(page0_content + page1_content),
        RawIndex(page0_raw),
        RawIndex(page0_raw + page1_raw),
    )
    .unwrap();

    assert!(ed.page_count() < pages_before);
    let expected: String = text
        .chars()
        .collect::<Vec<_>>()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i < page0_raw || *i >= page0_raw + page1_raw)
        .map(|(_, c)| *c)
        .collect();
    assert_eq!(ed.get_all_content(), expected);

    // no trailing empty page survives
    assert!(ed.pages().last().map(|p| p.raw_len().get() > 0).unwrap_or(false));
}

#[test]
fn shrinking_document_never_drops_page_zero() {
    let mut ed = tiny_editor();
    ed.insert(ContentIndex(0), RawIndex(0), "ab", &Style::default(), false);
    ed.delete(ContentIndex(0), ContentIndex(2), RawIndex(0), RawIndex(2))
        .unwrap();

    assert_eq!(ed.page_count(), 1);
    assert_eq!(ed.get_all_content(), "");
}

/// Raw offset of the `content`-th non-newline character in `text`.
fn raw_for_content(text: &str, content: usize) -> usize {
    let mut seen = 0;
    for (i, ch) in text.chars().enumerate() {
        if ch == '\n' {
            continue;
        }
        if seen == content {
            return i;
        }
        seen += 1;
    }
    text.chars().count()
}

fn content_len(text: &str) -> usize {
    text.chars().filter(|&c| c != '\n').count()
}

#[test]
fn randomized_edits_conserve_content() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut ed = tiny_editor();
    let mut model = String::new();

    for step in 0..300 {
        let deletable = content_len(&model);
        if deletable > 0 && rng.gen_range(0..10) < 3 {
            // delete one content character
            let c = rng.gen_range(0..deletable);
            let raw = raw_for_content(&model, c);
            ed.delete(
                ContentIndex(c),
                ContentIndex(c + 1),
                RawIndex(raw),
                RawIndex(raw + 1),
            )
            .unwrap();
            model.remove(raw);
        } else {
            // insert a short string, sometimes with a line break inside
            let len = rng.gen_range(1..4);
            let mut text: String = (0..len)
                .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
                .collect();
            if rng.gen_bool(0.3) {
                text.insert(rng.gen_range(0..=text.len()), '\n');
            }
            let c = rng.gen_range(0..=content_len(&model));
            let raw = raw_for_content(&model, c);
            ed.insert(
                ContentIndex(c),
                RawIndex(raw),
                &text,
                &Style::default(),
                false,
            );
            model.insert_str(raw, &text);
        }

        assert_eq!(
            ed.get_all_content(),
            model,
            "diverged after step {}",
            step
        );
    }

    assert!(ed.page_count() >= 1);

    // per-page lengths add back up to the whole document
    let total: usize = ed.pages().iter().map(|p| p.raw_len().get()).sum();
    assert_eq!(total, model.chars().count());

    // the flattened render covers every character, newlines included
    let items = ed.render_all();
    let rebuilt: String = items.iter().map(|it| it.real_ch).collect();
    assert_eq!(rebuilt, model);
}

#[test]
fn session_cursor_survives_page_breaks() {
    let mut session = EditorSession::new(tiny_editor());

    for _ in 0..10 {
        session.type_text("ab", &Style::default());
        session.press_enter();
    }
    assert!(session.editor().page_count() > 1);
    assert_eq!(session.editor().get_all_content(), "ab\n".repeat(10));

    // keep typing at the end across the page boundary
    session.type_text("cd", &Style::default());
    assert_eq!(
        session.editor().get_all_content(),
        format!("{}cd", "ab\n".repeat(10))
    );

    // erase "cd" and one full line
    for _ in 0..5 {
        session.backspace().unwrap();
    }
    assert_eq!(session.editor().get_all_content(), "ab\n".repeat(9));
}
