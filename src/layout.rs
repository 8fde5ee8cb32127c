// Page geometry, colours, fonts and the fixed business identity.
//
// All coordinates are millimetres measured from the top-left corner of the
// page, y growing downward. The PDF backend flips them into PDF space.

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Line spacing factor applied to the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BRAND: Color = Color::rgb(0, 152, 219);
    pub const DIVIDER: Color = Color::rgb(204, 204, 204);
    pub const GRID: Color = Color::rgb(160, 160, 160);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A piece of text pinned to a baseline position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSlot {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
}

// ============================================================================
// Business Identity
// ============================================================================

pub struct BusinessIdentity {
    pub trade_name: &'static str,
    pub owner: &'static str,
    pub tax_id: &'static str,
    pub phone: &'static str,
}

pub const BUSINESS: BusinessIdentity = BusinessIdentity {
    trade_name: "Vidraçaria Ambires",
    owner: "Daniel Ambires da Silva",
    tax_id: "43.244.454/0001-10",
    phone: "(11) 94705-8537",
};

// ============================================================================
// Regions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    /// Where content resumes on continuation pages.
    pub top_margin: f32,
    pub bottom_margin: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSpec {
    pub height: f32,
    pub fill: Color,
    pub text_color: Color,
    pub title: TextSlot,
    pub date: TextSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentitySpec {
    pub font_size: f32,
    pub left_x: f32,
    pub right_x: f32,
    /// Wrap width of the customer column.
    pub right_width: f32,
    /// Nominal baselines of the name, tax id and phone rows.
    pub rows: [f32; 3],
    pub row_step: f32,
    pub divider_x: f32,
    pub divider_top: f32,
    pub divider_bottom: f32,
    pub divider_width: f32,
    pub divider_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub start_y: f32,
    /// Minimum gap between the identity block and the table.
    pub gap_after_identity: f32,
    pub margin_x: f32,
    pub font_size: f32,
    pub cell_padding: f32,
    pub headers: [&'static str; 3],
    /// Share of the table width for each column.
    pub column_ratios: [f32; 3],
    pub header_fill: Color,
    pub header_text: Color,
    pub border_color: Color,
    pub border_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterSpec {
    /// Distance from the table end to the first footer baseline.
    pub offset: f32,
    /// Extra distance between the observations and the total line.
    pub total_offset: f32,
    pub x: f32,
    pub font_size: f32,
    pub max_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub page: PageSpec,
    pub header: HeaderSpec,
    pub identity: IdentitySpec,
    pub table: TableSpec,
    pub footer: FooterSpec,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            page: PageSpec {
                width: 210.0,
                height: 297.0,
                top_margin: 15.0,
                bottom_margin: 15.0,
            },
            header: HeaderSpec {
                height: 35.0,
                fill: Color::BRAND,
                text_color: Color::WHITE,
                title: TextSlot {
                    x: 18.0,
                    y: 17.0,
                    size: 27.0,
                    style: FontStyle::Bold,
                },
                date: TextSlot {
                    x: 20.0,
                    y: 25.0,
                    size: 14.0,
                    style: FontStyle::Regular,
                },
            },
            identity: IdentitySpec {
                font_size: 14.0,
                left_x: 20.0,
                right_x: 120.0,
                right_width: 76.0,
                rows: [50.0, 60.0, 70.0],
                row_step: 10.0,
                divider_x: 105.0,
                divider_top: 45.0,
                divider_bottom: 75.0,
                divider_width: 1.0,
                divider_color: Color::DIVIDER,
            },
            table: TableSpec {
                start_y: 90.0,
                gap_after_identity: 15.0,
                margin_x: 14.0,
                font_size: 10.0,
                cell_padding: 1.8,
                headers: ["Descrição", "Quantidade", "Cor"],
                column_ratios: [0.5, 0.2, 0.3],
                header_fill: Color::BRAND,
                header_text: Color::WHITE,
                border_color: Color::GRID,
                border_width: 0.1,
            },
            footer: FooterSpec {
                offset: 20.0,
                total_offset: 10.0,
                x: 20.0,
                font_size: 14.0,
                max_width: 170.0,
            },
        }
    }
}

impl Layout {
    pub fn table_width(&self) -> f32 {
        self.page.width - 2.0 * self.table.margin_x
    }

    pub fn column_widths(&self) -> [f32; 3] {
        let width = self.table_width();
        self.table.column_ratios.map(|ratio| width * ratio)
    }

    /// Lowest baseline content may use on a page.
    pub fn content_bottom(&self) -> f32 {
        self.page.height - self.page.bottom_margin
    }
}

// ============================================================================
// Text Metrics
// ============================================================================

/// Baseline-to-baseline distance for a font size, in mm.
pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_FACTOR * PT_TO_MM
}

/// Approximate Helvetica advance width of `text`, in mm.
///
/// Built-in PDF fonts carry no metrics we can query here, so glyphs are
/// bucketed into a handful of width classes. Good enough for wrapping.
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let em: f32 = text.chars().map(glyph_em).sum();
    let bold = match style {
        FontStyle::Regular => 1.0,
        FontStyle::Bold => 1.06,
    };
    em * bold * size * PT_TO_MM
}

fn glyph_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.24,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '/' | '-' => 0.32,
        'm' | 'M' | 'W' => 0.84,
        'w' => 0.72,
        c if c.is_ascii_digit() => 0.56,
        c if c.is_uppercase() => 0.68,
        _ => 0.54,
    }
}

/// Greedy word wrap into lines no wider than `max_width` mm.
///
/// Words are separated by single spaces and a line break consumes exactly
/// one of them, so runs of spaces and tabs survive as typed. Explicit
/// newlines are kept. A single word wider than the limit is split between
/// characters.
pub fn wrap_text(text: &str, max_width: f32, size: f32, style: FontStyle) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut started = false;
        for word in paragraph.split(' ') {
            let candidate = if started {
                format!("{} {}", current, word)
            } else {
                word.to_string()
            };
            if text_width(&candidate, size, style) <= max_width {
                current = candidate;
                started = true;
                continue;
            }
            if started {
                lines.push(std::mem::take(&mut current));
            }
            started = true;
            for c in word.chars() {
                current.push(c);
                if text_width(&current, size, style) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }
    lines
}
