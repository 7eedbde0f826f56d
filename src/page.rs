//! Index page: the statistic selector wrapped around the rendered map.

use crate::render::{escape, render_svg};
use crate::state::AppState;
use crate::types::Statistic;
use anyhow::Result;
use std::fmt::Write;

// Repaints in place from /api/view; the CSS transitions in the SVG animate it.
const SCRIPT: &str = r#"
const select = document.getElementById("options");

async function reloadMap() {
    const response = await fetch("/map.svg");
    if (!response.ok) {
        console.warn("map request failed", response.status);
        return;
    }
    const svg = await response.text();
    document.getElementById("map").outerHTML = svg.replace(/^<\?xml[^>]*>\s*/, "");
}

async function applyView(view) {
    // Shapes that loaded after this page was served are not in the DOM yet
    if (view.counties.length !== document.querySelectorAll("path.county").length) {
        await reloadMap();
    }

    const header = document.getElementById("header");
    header.textContent = view.header.text;
    header.style.fill = view.header.color;

    for (const county of view.counties) {
        const path = document.querySelector(`path[data-county="${CSS.escape(county.name)}"]`);
        if (!path) continue;
        path.style.fill = county.fill ?? "";
        path.querySelector("title").textContent = county.tooltip;
    }

    view.legend.swatches.forEach((color, i) => {
        const swatch = document.getElementById(`legend-swatch-${i}`);
        if (swatch) swatch.style.fill = color;
    });
    view.legend.labels.forEach((label, i) => {
        const text = document.getElementById(`legend-label-${i}`);
        if (text) text.textContent = label;
    });
    document.getElementById("legend-title").textContent = view.legend.title;
}

// Redraw each time a source settles until none is pending
async function followLoads() {
    let last = document.body.dataset.sources;
    for (;;) {
        const response = await fetch("/api/status");
        if (response.ok) {
            const status = await response.json();
            const current = [status.population, status.students, status.geometry].join(",");
            if (current !== last) await reloadMap();
            last = current;
            if (!current.includes("pending")) return;
        }
        await new Promise((resolve) => setTimeout(resolve, 1000));
    }
}

select.addEventListener("change", async () => {
    const response = await fetch(`/api/view?statistic=${select.value}`);
    if (!response.ok) {
        console.warn("view request failed", response.status);
        return;
    }
    await applyView(await response.json());
});

followLoads();
"#;

pub fn index_page(state: &AppState) -> Result<String> {
    let svg = render_svg(state)?;
    // Drop the XML declaration so the SVG can be inlined
    let svg = svg.split_once('\n').map(|(_, rest)| rest).unwrap_or(&svg);

    let sources = state.source_status()
        .iter()
        .map(|(_, status)| *status)
        .collect::<Vec<_>>()
        .join(",");

    let mut options = String::new();
    for statistic in Statistic::ALL {
        let selected = if statistic == state.active() { " selected" } else { "" };
        writeln!(options, r#"<option value="{}"{selected}>{}</option>"#,
            statistic.option_value(), escape(statistic.option_label()))?;
    }

    Ok(format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body data-sources="{sources}">
<select id="options">
{options}</select>
{svg}
<script>{SCRIPT}</script>
</body>
</html>
"#, title = escape(Statistic::Population.header())))
}
