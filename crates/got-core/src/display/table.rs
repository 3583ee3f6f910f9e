use crate::api::models::House;
use crate::utils::data::{page_span, total_pages};
use crate::utils::text::{empty_string_handler, join_or_placeholder, truncate_text};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};

const DEFAULT_WIDTH: usize = 100;

struct ColumnWidths {
    name: usize,
    region: usize,
    words: usize,
}

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Some(DEFAULT_WIDTH),
            use_colors: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width.clamp(40, 200));
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn set_colored_headers(&self, table: &mut Table, headers: &[&str], color: Color) {
        let cells: Vec<Cell> = headers.iter().map(|h| self.bold_header(h, color)).collect();
        table.set_header(cells);
    }

    pub fn render_house_list(&self, houses: &[House]) -> String {
        if houses.is_empty() {
            return "No houses on this page.".to_string();
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);
        self.set_colored_headers(&mut table, &["ID", "Name", "Region", "Words"], Color::Cyan);

        let widths = self.get_responsive_column_widths();

        for house in houses {
            let id = house
                .id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                self.colored_cell(&id, Color::Cyan),
                Cell::new(truncate_text(&house.name, widths.name)),
                Cell::new(truncate_text(
                    &empty_string_handler(&house.region),
                    widths.region,
                )),
                self.colored_cell(
                    &truncate_text(&empty_string_handler(&house.words), widths.words),
                    Color::DarkGrey,
                ),
            ]);
        }

        table.to_string()
    }

    /// Field-per-row view of one house.
    pub fn render_house_detail(&self, house: &House) -> String {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);
        self.set_colored_headers(&mut table, &["Field", "Value"], Color::Green);

        let rows = [
            ("Name", house.name.clone()),
            ("Region", empty_string_handler(&house.region)),
            ("Coat of arms", empty_string_handler(&house.coat_of_arms)),
            ("Words", empty_string_handler(&house.words)),
            ("Titles", join_or_placeholder(&house.titles)),
            ("Seats", join_or_placeholder(&house.seats)),
            ("Current lord", empty_string_handler(&house.current_lord)),
            ("Heir", empty_string_handler(&house.heir)),
            ("Overlord", empty_string_handler(&house.overlord)),
            ("Ancestral weapons", join_or_placeholder(&house.ancestral_weapons)),
            ("Sworn members", house.sworn_members.len().to_string()),
        ];

        for (field, value) in rows {
            table.add_row(vec![self.colored_cell(field, Color::Green), Cell::new(value)]);
        }

        table.to_string()
    }

    /// One-line summary shown above a page of results.
    /// `total` is the item count across all pages, when the server sent one.
    pub fn render_page_header(
        &self,
        page: u32,
        page_size: u32,
        item_count: usize,
        total: Option<u32>,
    ) -> String {
        match (page_span(page, page_size, item_count), total) {
            (Some((start, end)), Some(total)) => format!(
                "Houses {}-{} of {} (page {} of {}, {} per page)",
                start,
                end,
                total,
                page,
                total_pages(total, page_size),
                page_size
            ),
            (Some((start, end)), None) => format!(
                "Houses {}-{} (page {}, {} per page)",
                start, end, page, page_size
            ),
            (None, _) => format!("Page {} is empty, no more houses", page),
        }
    }

    fn configure_table_width(&self, table: &mut Table) {
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
    }

    fn get_responsive_column_widths(&self) -> ColumnWidths {
        match self.max_width.unwrap_or(DEFAULT_WIDTH) {
            0..=59 => ColumnWidths {
                name: 15,
                region: 8,
                words: 12,
            },
            60..=79 => ColumnWidths {
                name: 25,
                region: 12,
                words: 15,
            },
            80..=119 => ColumnWidths {
                name: 35,
                region: 18,
                words: 25,
            },
            _ => ColumnWidths {
                name: 50,
                region: 25,
                words: 40,
            },
        }
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}
