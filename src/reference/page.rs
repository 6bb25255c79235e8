//! The upload page and the HTML fragments returned by the merge endpoints.

use std::sync::OnceLock;

use maud::{Markup, html};
use numfmt::{Formatter, Precision};

use crate::{
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    reference::{DateRange, MergeResult},
};

/// The number of merged rows shown before downloading.
pub const PREVIEW_ROW_LIMIT: usize = 20;

pub const DOWNLOAD_FILE_NAME: &str = "EN_Reference_Added.csv";

fn merge_form_view() -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            id="merge-form"
            action=(endpoints::MERGE_DOWNLOAD)
            method="post"
            enctype="multipart/form-data"
            hx-encoding="multipart/form-data"
            hx-target-error="#merge-result"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="file" class=(FORM_LABEL_STYLE)
                {
                    "Upload your CSV"
                }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=".csv,text/csv"
                    required
                    hx-post=(endpoints::MERGE_DATE_RANGE)
                    hx-trigger="change"
                    hx-target="#date-range"
                    hx-target-error="#date-range"
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                {
                    "The file needs a 'Campaign Date' column and an 'EN Transaction ID' column."
                }
            }

            div id="date-range" {}

            button
                type="button"
                id="preview-button"
                hx-post=(endpoints::MERGE_PREVIEW)
                hx-target="#merge-result"
                hx-indicator="#indicator"
                hx-disabled-elt="#file, #preview-button, #download-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Fetch and Merge EN Data"
            }

            button
                type="submit"
                id="download-button"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Download Final CSV"
            }
        }
    }
}

/// The upload page, with `result` shown below the form.
pub fn merge_view(result: Option<Markup>) -> Markup {
    let nav_bar = NavBar::new(endpoints::MERGE_VIEW).into_html();
    let form = merge_form_view();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="mb-6 text-xl font-bold leading-tight tracking-tight md:text-2xl"
                {
                    "Add Honor/Memorial Information to Transaction Report Reference"
                }

                (form)
            }

            section id="merge-result" class="w-full max-w-screen-xl mt-6"
            {
                @if let Some(result) = result
                {
                    (result)
                }
            }
        }
    };

    base("Add References", &content)
}

pub fn date_range_view(date_range: &DateRange, row_count: usize) -> Markup {
    let rows = thousands_separated(row_count);

    Alert::Success {
        message: format!("Date range detected: {date_range}"),
        details: format!("{rows} rows in the uploaded CSV."),
    }
    .into_markup()
}

/// A success alert followed by the first rows of the merged table.
pub fn merge_result_view(result: &MergeResult) -> Markup {
    let formatter = thousands_separator_formatter();
    let matched = formatter.fmt_string(result.matched_rows);
    let total = formatter.fmt_string(result.table.row_count());

    let alert = Alert::Success {
        message: "Reference column added successfully!".to_owned(),
        details: format!(
            "Matched {matched} of {total} rows to EN honor/memorial data for {}. \
            Use \"Download Final CSV\" to save {DOWNLOAD_FILE_NAME}.",
            result.date_range
        ),
    };

    let headers = result.table.headers();
    let rows = result.table.rows().iter().take(PREVIEW_ROW_LIMIT);

    html! {
        (alert.into_markup())

        div class="relative overflow-x-auto shadow-md rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for header in headers
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                        }
                    }
                }

                tbody
                {
                    @for row in rows
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            @for cell in row
                            {
                                td class=(TABLE_CELL_STYLE) { (cell) }
                            }
                        }
                    }
                }
            }
        }

        @if result.table.row_count() > PREVIEW_ROW_LIMIT
        {
            p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
            {
                "Showing the first " (PREVIEW_ROW_LIMIT) " of " (total) " rows."
            }
        }
    }
}

fn thousands_separated(number: usize) -> String {
    thousands_separator_formatter().fmt_string(number)
}

fn thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap_or_else(|_| Formatter::new())
            .precision(Precision::Decimals(0))
    })
}
