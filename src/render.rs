// Quote snapshot -> display list.
//
// The renderer never touches the PDF library. It produces pages of drawing
// primitives in top-left millimetre coordinates, which keeps layout testable
// and leaves the backend a straight replay.

use tracing::debug;

use crate::draft::{LineItem, QuoteSnapshot};
use crate::error::AppError;
use crate::format::storage_to_display_date;
use crate::layout::{line_height, wrap_text, Color, FontStyle, Layout, BUSINESS, PT_TO_MM};

/// Cap height of Helvetica relative to the font size.
const ASCENT_FACTOR: f32 = 0.72;

// ============================================================================
// Display List
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
        color: Color,
    },
    /// `y` is the baseline.
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    /// Baseline-space y where the item table ended, on the last table page.
    pub table_end: f32,
}

impl Document {
    /// All text runs, in drawing order.
    pub fn text_content(&self) -> Vec<&str> {
        self.pages.iter().flat_map(|p| p.texts()).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_content().iter().any(|t| t.contains(needle))
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Lay out a quote.
///
/// Fails when the stored date cannot be read or when content cannot be
/// placed inside the page margins.
pub fn render_quote(quote: &QuoteSnapshot, layout: &Layout) -> Result<Document, AppError> {
    let date = if quote.quote_date.is_empty() {
        None
    } else {
        Some(storage_to_display_date(&quote.quote_date)?)
    };

    let mut renderer = Renderer::new(layout);
    renderer.draw_header(date.as_deref());
    let identity_bottom = renderer.draw_identity(quote)?;
    let table_top = layout
        .table
        .start_y
        .max(identity_bottom + layout.table.gap_after_identity);
    let table_end = renderer.draw_table(&quote.items, table_top)?;
    renderer.draw_footer(quote, table_end);

    debug!(
        pages = renderer.pages.len(),
        items = quote.items.len(),
        table_end,
        "quote laid out"
    );

    Ok(Document {
        title: format!("Orçamento {}", BUSINESS.trade_name),
        page_width: layout.page.width,
        page_height: layout.page.height,
        pages: renderer.pages,
        table_end,
    })
}

struct Renderer<'a> {
    layout: &'a Layout,
    pages: Vec<Page>,
}

impl<'a> Renderer<'a> {
    fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            pages: vec![Page::default()],
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn new_page(&mut self) -> f32 {
        self.pages.push(Page::default());
        self.layout.page.top_margin
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, style: FontStyle, color: Color) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size,
            style,
            color,
        });
    }

    // ------------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------------

    fn draw_header(&mut self, date: Option<&str>) {
        let layout = self.layout;
        let header = &layout.header;
        self.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: layout.page.width,
            height: header.height,
            color: header.fill,
        });

        let title = header.title;
        self.text(
            BUSINESS.trade_name,
            title.x,
            title.y,
            title.size,
            title.style,
            header.text_color,
        );

        if let Some(date) = date {
            let slot = header.date;
            self.text(
                &format!("Data: {}", date),
                slot.x,
                slot.y,
                slot.size,
                slot.style,
                header.text_color,
            );
        }
    }

    // ------------------------------------------------------------------------
    // Identity Block
    // ------------------------------------------------------------------------

    /// Returns the lowest y used by the block. The block never leaves the
    /// first page; a customer column taller than the page is an error.
    fn draw_identity(&mut self, quote: &QuoteSnapshot) -> Result<f32, AppError> {
        let layout = self.layout;
        let id = &layout.identity;
        let size = id.font_size;

        let fixed = [
            format!("Nome: {}", BUSINESS.owner),
            format!("CNPJ: {}", BUSINESS.tax_id),
            format!("Telefone: {}", BUSINESS.phone),
        ];
        for (line, y) in fixed.iter().zip(id.rows) {
            self.text(line, id.left_x, y, size, FontStyle::Regular, Color::BLACK);
        }

        let customer = &quote.customer;
        if customer.is_empty() {
            return Ok(id.divider_bottom);
        }

        let mut rows: [Vec<String>; 3] = Default::default();
        if !customer.name.is_empty() {
            rows[0] = wrap_text(
                &format!("Nome: {}", customer.name),
                id.right_width,
                size,
                FontStyle::Regular,
            );
        }
        if !customer.tax_id.is_empty() {
            rows[1] = vec![format!("CNPJ/CPF: {}", customer.tax_id_display())];
        }
        if !customer.phone.is_empty() {
            rows[2] = vec![format!("Telefone: {}", customer.phone_display())];
        }

        // A wrapped name pushes the later rows down instead of overlapping.
        let step = line_height(size);
        let mut placed: Vec<(&str, f32)> = Vec::new();
        for (lines, slot) in rows.iter().zip(id.rows) {
            if lines.is_empty() {
                continue;
            }
            let mut y = match placed.last() {
                Some((_, prev)) => slot.max(prev + id.row_step),
                None => slot,
            };
            for line in lines {
                placed.push((line, y));
                y += step;
            }
        }

        let last_baseline = placed.last().map(|(_, y)| *y).unwrap_or(id.rows[0]);
        if last_baseline > layout.content_bottom() {
            return Err(AppError::PdfError(format!(
                "dados do cliente não cabem na página ({} linhas)",
                placed.len()
            )));
        }
        for (line, y) in placed {
            self.text(line, id.right_x, y, size, FontStyle::Regular, Color::BLACK);
        }

        let bottom = (last_baseline + id.row_step / 2.0)
            .max(id.divider_bottom)
            .min(layout.content_bottom());
        self.push(DrawOp::Line {
            x1: id.divider_x,
            y1: id.divider_top,
            x2: id.divider_x,
            y2: bottom,
            line_width: id.divider_width,
            color: id.divider_color,
        });
        Ok(bottom)
    }

    // ------------------------------------------------------------------------
    // Item Table
    // ------------------------------------------------------------------------

    /// Draws header and rows starting at `top`; returns the y of the table's
    /// bottom edge on the page where it ends.
    ///
    /// A row that does not fit moves to the next page. A row taller than a
    /// whole page is split line by line, repeating the header on each page.
    fn draw_table(&mut self, items: &[LineItem], top: f32) -> Result<f32, AppError> {
        let layout = self.layout;
        let headers = self.wrap_cells(&layout.table.headers.map(str::to_string), FontStyle::Bold);
        let header_lines = line_count(&headers);

        let mut top = top;
        if top + self.row_height(header_lines) > layout.content_bottom() {
            top = self.new_page();
        }
        let fresh_top = layout.page.top_margin + self.row_height(header_lines);
        let lines_per_page = self.lines_fitting(fresh_top);
        if lines_per_page == 0 {
            return Err(AppError::PdfError(
                "a tabela de itens não cabe na página".to_string(),
            ));
        }

        let mut y = self.draw_cells(&headers, 0, header_lines, top, true);

        for item in items {
            let cells = self.wrap_cells(
                &[
                    item.description.clone(),
                    item.quantity_display(),
                    item.color.clone(),
                ],
                FontStyle::Regular,
            );
            let total = line_count(&cells);
            let mut done = 0;
            while done < total {
                let room = self.lines_fitting(y);
                let remaining = total - done;
                if remaining <= room {
                    y = self.draw_cells(&cells, done, remaining, y, false);
                    break;
                }
                let keep_together = done == 0 && total <= lines_per_page;
                if room == 0 || keep_together {
                    y = self.new_page();
                    y = self.draw_cells(&headers, 0, header_lines, y, true);
                    continue;
                }
                self.draw_cells(&cells, done, room, y, false);
                done += room;
                y = self.new_page();
                y = self.draw_cells(&headers, 0, header_lines, y, true);
            }
        }
        Ok(y)
    }

    fn wrap_cells(&self, cells: &[String; 3], style: FontStyle) -> [Vec<String>; 3] {
        let table = &self.layout.table;
        let widths = self.layout.column_widths();
        std::array::from_fn(|i| {
            wrap_text(
                &cells[i],
                widths[i] - 2.0 * table.cell_padding,
                table.font_size,
                style,
            )
        })
    }

    fn row_height(&self, lines: usize) -> f32 {
        let table = &self.layout.table;
        lines.max(1) as f32 * line_height(table.font_size) + 2.0 * table.cell_padding
    }

    /// How many text lines of a row starting at `top` fit above the margin.
    fn lines_fitting(&self, top: f32) -> usize {
        let table = &self.layout.table;
        let free = self.layout.content_bottom() - top - 2.0 * table.cell_padding;
        let lines = (free / line_height(table.font_size) + 1e-4).floor();
        if lines > 0.0 {
            lines as usize
        } else {
            0
        }
    }

    /// Draw lines `from..from + count` of each cell as one grid row with its
    /// top edge at `top`; returns its bottom edge.
    fn draw_cells(
        &mut self,
        cells: &[Vec<String>; 3],
        from: usize,
        count: usize,
        top: f32,
        is_header: bool,
    ) -> f32 {
        let layout = self.layout;
        let table = &layout.table;
        let widths = layout.column_widths();
        let style = if is_header {
            FontStyle::Bold
        } else {
            FontStyle::Regular
        };
        let text_color = if is_header {
            table.header_text
        } else {
            Color::BLACK
        };
        let height = self.row_height(count);
        let first_baseline = top + table.cell_padding + table.font_size * ASCENT_FACTOR * PT_TO_MM;
        let step = line_height(table.font_size);

        let mut x = table.margin_x;
        for (lines, width) in cells.iter().zip(widths) {
            if is_header {
                self.push(DrawOp::FillRect {
                    x,
                    y: top,
                    width,
                    height,
                    color: table.header_fill,
                });
            }
            self.push(DrawOp::StrokeRect {
                x,
                y: top,
                width,
                height,
                line_width: table.border_width,
                color: table.border_color,
            });
            for (n, line) in lines.iter().skip(from).take(count).enumerate() {
                if line.is_empty() {
                    continue;
                }
                self.text(
                    line,
                    x + table.cell_padding,
                    first_baseline + n as f32 * step,
                    table.font_size,
                    style,
                    text_color,
                );
            }
            x += width;
        }
        top + height
    }

    // ------------------------------------------------------------------------
    // Footer
    // ------------------------------------------------------------------------

    fn draw_footer(&mut self, quote: &QuoteSnapshot, table_end: f32) {
        let layout = self.layout;
        let footer = &layout.footer;
        let size = footer.font_size;
        let step = line_height(size);
        let bottom = layout.content_bottom();

        let observations = if quote.observations.is_empty() {
            Vec::new()
        } else {
            wrap_text(
                &format!("Observações: {}", quote.observations),
                footer.max_width,
                size,
                FontStyle::Regular,
            )
        };
        let total = quote
            .total_display
            .as_ref()
            .map(|t| format!("Valor Total: {}", t));

        if observations.is_empty() && total.is_none() {
            return;
        }

        let mut needed = 0.0;
        if !observations.is_empty() {
            needed += (observations.len() - 1) as f32 * step;
        }
        if total.is_some() && !observations.is_empty() {
            needed += footer.total_offset;
        }

        // Keep the footer together when a fresh page can hold it, otherwise
        // let it flow line by line.
        let fresh = layout.page.top_margin + step;
        let mut y = table_end + footer.offset;
        if y > bottom || (y + needed > bottom && fresh + needed <= bottom) {
            y = self.new_page() + step;
        }

        if !observations.is_empty() {
            for line in &observations {
                if y > bottom {
                    y = self.new_page() + step;
                }
                self.text(line, footer.x, y, size, FontStyle::Regular, Color::BLACK);
                y += step;
            }
            y += footer.total_offset - step;
        }
        if let Some(total) = total {
            if y > bottom {
                y = self.new_page() + step;
            }
            self.text(&total, footer.x, y, size, FontStyle::Regular, Color::BLACK);
        }
    }
}

fn line_count(cells: &[Vec<String>; 3]) -> usize {
    cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Field, QuoteDraft};

    fn sample_draft() -> QuoteDraft {
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::CustomerName, "Maria Souza").unwrap();
        d.set_field(Field::CustomerTaxId, "12345678901").unwrap();
        d.set_field(Field::CustomerPhone, "11947058537").unwrap();
        d.set_field(Field::ItemDescription, "Vidro temperado").unwrap();
        d.set_field(Field::ItemQuantity, "2").unwrap();
        d.set_field(Field::ItemColor, "Verde").unwrap();
        d.add_item().unwrap();
        d.set_field(Field::Observations, "Entregar até sexta").unwrap();
        d.set_field(Field::TotalAmount, "250000").unwrap();
        d
    }

    fn texts_at(doc: &Document, needle: &str) -> Vec<(f32, f32)> {
        doc.pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, x, y, .. } if text.contains(needle) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    fn has_divider(page: &Page) -> bool {
        page.ops
            .iter()
            .any(|op| matches!(op, DrawOp::Line { x1, x2, .. } if *x1 == 105.0 && *x2 == 105.0))
    }

    fn pages_with(doc: &Document, needle: &str) -> Vec<usize> {
        doc.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.texts().any(|t| t.contains(needle)))
            .map(|(n, _)| n)
            .collect()
    }

    /// Lowest y reached by anything drawn on the page.
    fn lowest_extent(page: &Page) -> f32 {
        page.ops
            .iter()
            .map(|op| match op {
                DrawOp::FillRect { y, height, .. } | DrawOp::StrokeRect { y, height, .. } => {
                    y + height
                }
                DrawOp::Line { y1, y2, .. } => y1.max(*y2),
                DrawOp::Text { y, .. } => *y,
            })
            .fold(0.0, f32::max)
    }

    fn assert_within_margins(doc: &Document, layout: &Layout) {
        for (n, page) in doc.pages.iter().enumerate() {
            let lowest = lowest_extent(page);
            assert!(
                lowest <= layout.content_bottom() + 1e-3,
                "page {} reaches {}",
                n + 1,
                lowest
            );
        }
    }

    #[test]
    fn full_quote_contains_formatted_values() {
        let doc = render_quote(&sample_draft().snapshot(), &Layout::default()).unwrap();

        assert!(doc.contains_text("Vidraçaria Ambires"));
        assert!(doc.contains_text("Data: 20/05/2024"));
        assert!(doc.contains_text("Nome: Maria Souza"));
        assert!(doc.contains_text("CNPJ/CPF: 123.456.789-01"));
        assert!(doc.contains_text("Telefone: (11) 94705-8537"));
        let content = doc.text_content();
        assert!(content.contains(&"Vidro temperado"));
        assert!(content.contains(&"2"));
        assert!(content.contains(&"Verde"));
        assert!(content.contains(&"Observações: Entregar até sexta"));
        assert!(content.contains(&"Valor Total: R$ 2.500,00"));
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn header_band_is_first_op() {
        let doc = render_quote(&sample_draft().snapshot(), &Layout::default()).unwrap();
        assert_eq!(
            doc.pages[0].ops[0],
            DrawOp::FillRect {
                x: 0.0,
                y: 0.0,
                width: 210.0,
                height: 35.0,
                color: Color::rgb(0, 152, 219),
            }
        );
    }

    #[test]
    fn business_identity_is_fixed() {
        let doc = render_quote(&QuoteDraft::with_date("2024-05-20").snapshot(), &Layout::default())
            .unwrap();
        assert_eq!(texts_at(&doc, "Nome: Daniel Ambires da Silva"), vec![(20.0, 50.0)]);
        assert_eq!(texts_at(&doc, "CNPJ: 43.244.454/0001-10"), vec![(20.0, 60.0)]);
        assert_eq!(texts_at(&doc, "Telefone: (11) 94705-8537"), vec![(20.0, 70.0)]);
    }

    #[test]
    fn divider_only_with_customer_data() {
        let layout = Layout::default();
        let empty = render_quote(&QuoteDraft::with_date("2024-05-20").snapshot(), &layout).unwrap();
        assert!(!has_divider(&empty.pages[0]));

        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::CustomerPhone, "1140001000").unwrap();
        let doc = render_quote(&d.snapshot(), &layout).unwrap();
        assert!(has_divider(&doc.pages[0]));
        assert!(doc.contains_text("Telefone: (11) 4000-1000"));
        assert!(!doc.contains_text("CNPJ/CPF"));
    }

    #[test]
    fn customer_rows_use_right_column() {
        let doc = render_quote(&sample_draft().snapshot(), &Layout::default()).unwrap();
        assert_eq!(texts_at(&doc, "Nome: Maria"), vec![(120.0, 50.0)]);
        assert_eq!(texts_at(&doc, "CNPJ/CPF"), vec![(120.0, 60.0)]);
        assert_eq!(texts_at(&doc, "Telefone: (11) 94705"), vec![(20.0, 70.0), (120.0, 70.0)]);
    }

    #[test]
    fn long_customer_name_wraps_and_pushes_rows() {
        let mut d = sample_draft();
        d.set_field(
            Field::CustomerName,
            "Companhia Brasileira de Esquadrias e Vidros Temperados Limitada",
        )
        .unwrap();
        let doc = render_quote(&d.snapshot(), &Layout::default()).unwrap();

        let name_lines: Vec<_> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, .. } if *x == 120.0 && *y < 60.0 => Some(*y),
                _ => None,
            })
            .collect();
        assert!(name_lines.len() > 1);

        let tax = texts_at(&doc, "CNPJ/CPF")[0];
        assert!(tax.1 >= name_lines.last().unwrap() + 10.0);
    }

    #[test]
    fn footer_follows_table_end() {
        let layout = Layout::default();
        let doc = render_quote(&sample_draft().snapshot(), &layout).unwrap();
        let obs = texts_at(&doc, "Observações:")[0];
        let total = texts_at(&doc, "Valor Total:")[0];
        assert!((obs.1 - (doc.table_end + 20.0)).abs() < 1e-3);
        assert!((total.1 - (obs.1 + 10.0)).abs() < 1e-3);
        assert_eq!(obs.0, 20.0);
    }

    #[test]
    fn table_end_grows_with_rows() {
        let layout = Layout::default();
        let mut d = QuoteDraft::with_date("2024-05-20");
        let one = render_quote(&d.snapshot(), &layout).unwrap().table_end;
        for _ in 0..3 {
            d.set_field(Field::ItemDescription, "Espelho").unwrap();
            d.add_item().unwrap();
        }
        let four = render_quote(&d.snapshot(), &layout).unwrap().table_end;
        assert!(four > one);
        assert!(one > layout.table.start_y);
    }

    #[test]
    fn footer_is_omitted_when_empty() {
        let doc = render_quote(&QuoteDraft::with_date("2024-05-20").snapshot(), &Layout::default())
            .unwrap();
        assert!(!doc.contains_text("Observações"));
        assert!(!doc.contains_text("Valor Total"));
    }

    #[test]
    fn total_without_observations_sits_at_offset() {
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::TotalAmount, "100").unwrap();
        let doc = render_quote(&d.snapshot(), &Layout::default()).unwrap();
        let total = texts_at(&doc, "Valor Total: R$ 1,00")[0];
        assert!((total.1 - (doc.table_end + 20.0)).abs() < 1e-3);
    }

    #[test]
    fn blank_quantity_leaves_cell_empty() {
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::ItemDescription, "Box").unwrap();
        d.set_field(Field::ItemColor, "Incolor").unwrap();
        d.add_item().unwrap();
        let doc = render_quote(&d.snapshot(), &Layout::default()).unwrap();
        let content = doc.text_content();
        let box_at = content.iter().position(|t| *t == "Box").unwrap();
        assert_eq!(content[box_at + 1], "Incolor");
    }

    #[test]
    fn long_item_list_paginates_with_repeated_header() {
        let mut d = QuoteDraft::with_date("2024-05-20");
        for n in 0..60 {
            d.set_field(Field::ItemDescription, &format!("Vidro {}", n)).unwrap();
            d.set_field(Field::ItemQuantity, "1").unwrap();
            d.add_item().unwrap();
        }
        let layout = Layout::default();
        let doc = render_quote(&d.snapshot(), &layout).unwrap();
        assert!(doc.pages.len() > 1);
        for page in &doc.pages {
            assert!(page.texts().any(|t| t == "Descrição"));
        }
        assert!(doc.contains_text("Vidro 59"));
        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::StrokeRect { y, height, .. } = op {
                    assert!(y + height <= layout.content_bottom() + 1e-3);
                }
            }
        }
    }

    #[test]
    fn footer_moves_to_next_page_when_table_fills_first() {
        let layout = Layout::default();
        let step = line_height(layout.footer.font_size);
        let mut d = sample_draft();
        let doc = loop {
            d.set_field(Field::ItemDescription, "Vidro temperado 8mm").unwrap();
            d.set_field(Field::ItemQuantity, "1").unwrap();
            d.add_item().unwrap();
            assert!(d.items().len() < 80, "table never reached the footer limit");
            let doc = render_quote(&d.snapshot(), &layout).unwrap();
            if doc.table_end + layout.footer.offset + layout.footer.total_offset
                > layout.content_bottom()
            {
                break doc;
            }
        };

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(pages_with(&doc, "Descrição"), vec![0]);
        assert_eq!(pages_with(&doc, "Observações:"), vec![1]);
        assert_eq!(pages_with(&doc, "Valor Total:"), vec![1]);

        let obs = texts_at(&doc, "Observações:")[0];
        let total = texts_at(&doc, "Valor Total:")[0];
        assert!((obs.1 - (layout.page.top_margin + step)).abs() < 1e-3);
        assert!((total.1 - (obs.1 + layout.footer.total_offset)).abs() < 1e-3);
        assert_within_margins(&doc, &layout);
    }

    #[test]
    fn tall_description_splits_across_pages() {
        let layout = Layout::default();
        let description = "Vidro laminado incolor ".repeat(200);
        let description = description.trim_end();
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::ItemDescription, description).unwrap();
        d.set_field(Field::ItemQuantity, "1").unwrap();
        d.set_field(Field::ItemColor, "Incolor").unwrap();
        d.add_item().unwrap();
        d.set_field(Field::ItemDescription, "Espelho").unwrap();
        d.add_item().unwrap();

        let doc = render_quote(&d.snapshot(), &layout).unwrap();
        assert!(doc.pages.len() >= 2);
        for page in &doc.pages {
            assert!(page.texts().any(|t| t == "Descrição"));
        }
        assert_within_margins(&doc, &layout);

        let column_x = layout.table.margin_x + layout.table.cell_padding;
        let cells: Vec<&str> = doc
            .pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, x, .. } if (x - column_x).abs() < 1e-3 => Some(text.as_str()),
                _ => None,
            })
            .filter(|t| *t != "Descrição")
            .collect();
        assert_eq!(cells.last(), Some(&"Espelho"));
        assert_eq!(cells[..cells.len() - 1].join(" "), description);
    }

    #[test]
    fn long_observations_flow_onto_new_pages() {
        let layout = Layout::default();
        let mut d = sample_draft();
        d.set_field(Field::Observations, &"Entregar ate sexta pela manha ".repeat(150))
            .unwrap();
        let doc = render_quote(&d.snapshot(), &layout).unwrap();

        assert!(doc.pages.len() >= 2);
        assert_within_margins(&doc, &layout);

        let last = doc.pages.len() - 1;
        assert_eq!(pages_with(&doc, "Valor Total:"), vec![last]);
        let total = texts_at(&doc, "Valor Total:")[0];
        let last_obs = doc.pages[last]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, y, .. } if text.contains("manha") => Some(*y),
                _ => None,
            })
            .fold(0.0, f32::max);
        assert!(total.1 > last_obs);
    }

    #[test]
    fn oversized_customer_name_never_leaves_the_page() {
        let layout = Layout::default();
        let mut pushed_table = false;
        for repeat in 1..=80 {
            let mut d = sample_draft();
            d.set_field(Field::CustomerName, &"Vidros Temperados ".repeat(repeat))
                .unwrap();
            match render_quote(&d.snapshot(), &layout) {
                Ok(doc) => {
                    assert_within_margins(&doc, &layout);
                    if pages_with(&doc, "Descrição") == vec![1] {
                        pushed_table = true;
                    }
                }
                Err(AppError::PdfError(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert!(pushed_table, "no name length moved the table to page 2");

        let mut d = sample_draft();
        d.set_field(Field::CustomerName, &"Vidros Temperados ".repeat(200))
            .unwrap();
        let err = render_quote(&d.snapshot(), &layout).unwrap_err();
        assert!(matches!(err, AppError::PdfError(_)));
    }

    #[test]
    fn item_text_keeps_repeated_spaces() {
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::ItemDescription, "Vidro  4mm").unwrap();
        d.add_item().unwrap();
        let doc = render_quote(&d.snapshot(), &Layout::default()).unwrap();
        assert!(doc.text_content().contains(&"Vidro  4mm"));
    }

    #[test]
    fn missing_date_skips_date_line() {
        let mut d = QuoteDraft::with_date("2024-05-20");
        d.set_field(Field::QuoteDate, "").unwrap();
        let doc = render_quote(&d.snapshot(), &Layout::default()).unwrap();
        assert!(!doc.contains_text("Data:"));
    }

    #[test]
    fn malformed_date_fails() {
        let d = QuoteDraft::with_date("20-05-2024");
        let err = render_quote(&d.snapshot(), &Layout::default()).unwrap_err();
        assert!(matches!(err, AppError::DateError(_)));
    }
}
