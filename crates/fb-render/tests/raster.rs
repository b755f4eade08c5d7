//! Integration tests: diagram → pixmap → sampled pixels.

use fb_core::kurbo::Point;
use fb_core::{ArrowEnd, Diagram, ElementId, ElementKind, Mutation};
use fb_render::{
    ExportError, RenderOptions, export_png, flatten_onto_white, fonts_available, new_surface, render_diagram,
};
use pretty_assertions::assert_eq;

fn rgba(pixmap: &tiny_skia::Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let p = pixmap.pixel(x, y).expect("pixel in bounds");
    (p.red(), p.green(), p.blue(), p.alpha())
}

fn add_card(d: &mut Diagram, at: (f64, f64)) -> ElementId {
    let card = d.create_element(Some(ElementKind::Card), "basic", Point::new(at.0, at.1), None);
    let id = card.id;
    d.apply(Mutation::AddElement(Box::new(card)));
    id
}

fn add_arrow(d: &mut Diagram, from: (f64, f64), to: (f64, f64)) -> ElementId {
    let arrow = d.create_arrow_stub("line", Point::new(from.0, from.1));
    let id = arrow.id;
    d.apply(Mutation::AddElement(Box::new(arrow)));
    d.apply(Mutation::SetArrowPoint {
        id,
        end: ArrowEnd::End,
        point: Point::new(to.0, to.1),
    });
    id
}

// ─── Grid and background ─────────────────────────────────────────────────

#[test]
fn grid_lines_every_twenty_pixels() {
    let d = Diagram::new();
    let pixmap = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (800, 600));
    assert_eq!(rgba(&pixmap, 20, 5), (0xe9, 0xec, 0xef, 255));
    assert_eq!(rgba(&pixmap, 10, 5).3, 0);
}

#[test]
fn grid_can_be_hidden() {
    let d = Diagram::new();
    let options = RenderOptions {
        show_grid: false,
        ..RenderOptions::default()
    };
    let pixmap = render_diagram(&d, &[], &options).unwrap();
    assert_eq!(rgba(&pixmap, 20, 5).3, 0);
}

#[test]
fn surface_follows_zoom() {
    let d = Diagram::new();
    let pixmap = new_surface(d.canvas, 1.5).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (1200, 900));
}

// ─── Elements ────────────────────────────────────────────────────────────

#[test]
fn card_fills_with_its_color() {
    let mut d = Diagram::new();
    add_card(&mut d, (100.0, 100.0));
    let pixmap = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    // Below the label.
    assert_eq!(rgba(&pixmap, 115, 160), (0x00, 0x7b, 0xff, 255));
}

#[test]
fn card_label_is_drawn_in_black_at_center() {
    if !fonts_available() {
        eprintln!("no system fonts, skipping label pixels");
        return;
    }
    let mut d = Diagram::new();
    let card = add_card(&mut d, (100.0, 100.0));
    let pixmap = render_diagram(&d, &[], &RenderOptions::default()).unwrap();

    // "Card" at 14px spans roughly x 155..185, y 128..142.
    let inked = (150..190)
        .flat_map(|x| (126..144).map(move |y| (x, y)))
        .filter(|&(x, y)| {
            let (r, g, b, _) = rgba(&pixmap, x, y);
            r < 60 && g < 60 && b < 120
        })
        .count();
    assert!(inked > 20, "only {inked} dark pixels in the label area");

    // Blank text leaves the fill untouched.
    d.apply(Mutation::SetText {
        ids: smallvec::smallvec![card],
        text: String::new(),
    });
    let blank = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    assert_eq!(rgba(&blank, 170, 135), (0x00, 0x7b, 0xff, 255));
}

#[test]
fn arrow_strokes_with_darkened_color() {
    let mut d = Diagram::new();
    add_arrow(&mut d, (100.0, 300.0), (300.0, 300.0));
    let pixmap = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    // #6c757d darkened by 20%.
    assert_eq!(rgba(&pixmap, 200, 300), (86, 93, 100, 255));
}

#[test]
fn edited_element_glows() {
    let mut d = Diagram::new();
    let card = add_card(&mut d, (100.0, 100.0));
    let quiet = RenderOptions {
        show_grid: false,
        ..RenderOptions::default()
    };
    let plain = render_diagram(&d, &[], &quiet).unwrap();
    assert_eq!(rgba(&plain, 245, 135).3, 0);

    let editing = RenderOptions {
        editing: Some(card),
        ..quiet
    };
    let glowing = render_diagram(&d, &[], &editing).unwrap();
    let (r, g, b, a) = rgba(&glowing, 245, 135);
    assert!(a > 0);
    assert!(b > r && b > g);
    // Far outside the glow stays clear.
    assert_eq!(rgba(&glowing, 270, 135).3, 0);
}

// ─── Selection decorations ───────────────────────────────────────────────

#[test]
fn handles_only_on_primary_for_single_selection() {
    let mut d = Diagram::new();
    let card = add_card(&mut d, (100.0, 100.0));

    let plain = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    assert_eq!(rgba(&plain, 242, 172).3, 0);

    d.mark_selected(Some(card));
    let selected = render_diagram(&d, &[card], &RenderOptions::default()).unwrap();
    assert_eq!(rgba(&selected, 242, 172), (0x0d, 0x6e, 0xfd, 255));
}

#[test]
fn co_selected_members_get_muted_stroke_and_handles() {
    let mut d = Diagram::new();
    let first = add_card(&mut d, (100.0, 100.0));
    let second = add_card(&mut d, (300.0, 100.0));
    d.mark_selected(Some(first));

    let pixmap = render_diagram(&d, &[first, second], &RenderOptions::default()).unwrap();
    assert_eq!(rgba(&pixmap, 299, 135), (0x6c, 0x75, 0x7d, 255));
    assert_eq!(rgba(&pixmap, 442, 172), (0x0d, 0x6e, 0xfd, 255));
}

// ─── PNG export ──────────────────────────────────────────────────────────

#[test]
fn png_export_requires_title() {
    let mut d = Diagram::new();
    add_card(&mut d, (100.0, 100.0));
    d.title = "   ".into();
    let err = export_png(&d, &[], &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::MissingTitle));
}

#[test]
fn png_export_encodes_titled_diagram() {
    let mut d = Diagram::new();
    add_card(&mut d, (100.0, 100.0));
    d.title = "Release flow".into();
    let bytes = export_png(&d, &[], &RenderOptions::default()).unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn flattening_turns_transparency_white() {
    let d = Diagram::new();
    let scene = render_diagram(&d, &[], &RenderOptions::default()).unwrap();
    let flat = flatten_onto_white(&scene).unwrap();
    assert_eq!(rgba(&flat, 10, 5), (255, 255, 255, 255));
    assert_eq!(rgba(&flat, 20, 5), (0xe9, 0xec, 0xef, 255));
}
