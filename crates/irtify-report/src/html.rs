//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined and one
//! SVG item characteristic curve per item.

use anyhow::{Context, Result};
use std::path::Path;

use irtify_core::irt::{icc_curve, IrtItemParameters, ThetaGrid};

use crate::report::{fmt_estimate, mean_score, AnalysisReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an analysis report.
pub fn generate_html(report: &AnalysisReport) -> String {
    let a = &report.analysis;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>irtify report: {}</title>\n",
        html_escape(&report.dataset.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>irtify report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Data set: <strong>{}</strong> | {} items | {} examinees | mean score {:.2} | {}</p>\n",
        html_escape(&report.dataset.name),
        report.dataset.item_count,
        report.dataset.examinee_count,
        mean_score(a),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // CTT
    html.push_str("<section class=\"ctt\">\n");
    html.push_str("<h2>Classical Test Theory</h2>\n");
    html.push_str("<table id=\"ctt\">\n");
    html.push_str(&sortable_header(
        "ctt",
        &["Item", "Difficulty", "Discrimination", "Reliability proxy"],
    ));
    html.push_str("<tbody>\n");
    for m in &a.ctt {
        let flagged = [&m.discrimination, &m.reliability_proxy]
            .iter()
            .any(|e| e.is_degenerate() || e.is_insufficient());
        let class = if flagged {
            " class=\"degenerate\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{:.3}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&m.item),
            m.difficulty,
            fmt_estimate(&m.discrimination),
            fmt_estimate(&m.reliability_proxy)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str(
        "<p class=\"meta\">* degenerate statistic (zero variance or empty group), reported as 0; \
         n/a: fewer than two examinees</p>\n",
    );
    html.push_str("</section>\n");

    // Option distribution
    if !a.options.is_empty() {
        html.push_str("<section class=\"options\">\n");
        html.push_str("<h2>Option distribution</h2>\n");
        html.push_str("<table>\n<thead><tr><th>Item</th><th>Options</th><th>Missing</th></tr></thead>\n<tbody>\n");
        for d in &a.options {
            let cells: Vec<String> = d
                .counts
                .iter()
                .map(|c| {
                    let label = format!("{}: {}", html_escape(c.category.as_str()), c.count);
                    if c.is_key {
                        format!("<strong>{label}</strong>")
                    } else {
                        label
                    }
                })
                .collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&d.item),
                cells.join(" &middot; "),
                d.missing
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    // IRT
    html.push_str("<section class=\"irt\">\n");
    html.push_str("<h2>Item parameters (proxy 3PL)</h2>\n");
    html.push_str("<table id=\"irt\">\n");
    html.push_str(&sortable_header("irt", &["Item", "a", "b", "c", "Categories"]));
    html.push_str("<tbody>\n");
    for p in &a.irt {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.3}</td><td>{:.3}</td><td>{}</td></tr>\n",
            html_escape(&p.item),
            fmt_estimate(&p.discrimination),
            p.difficulty,
            p.guessing,
            p.categories_observed
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // DIF
    if let Some(dif) = &a.dif {
        html.push_str("<section class=\"dif\">\n");
        html.push_str(&format!(
            "<h2>Differential Item Functioning: {} (n={}) vs {} (n={})</h2>\n",
            html_escape(&dif.groups[0]),
            dif.group_sizes[0],
            html_escape(&dif.groups[1]),
            dif.group_sizes[1]
        ));
        html.push_str("<table id=\"dif\">\n");
        html.push_str(&sortable_header(
            "dif",
            &["Item", "\u{394}a", "\u{394}b", "\u{394}c", "\u{3c7}\u{b2}", "p", "DIF"],
        ));
        html.push_str("<tbody>\n");
        for r in &dif.items {
            let class = if r.dif_detected { "fail" } else { "pass" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{:+.3}</td><td>{:+.3}</td><td>{:+.3}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td></tr>\n",
                class,
                html_escape(&r.item),
                r.delta.discrimination,
                r.delta.difficulty,
                r.delta.guessing,
                r.chi2,
                r.p_value,
                if r.dif_detected { "yes" } else { "no" }
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str(&format!(
            "<p class=\"meta\">Flagged at p &lt; {}</p>\n",
            dif.significance_level
        ));
        html.push_str("</section>\n");
    } else if let Some(reason) = &a.dif_error {
        html.push_str("<section class=\"dif\">\n");
        html.push_str("<h2>Differential Item Functioning</h2>\n");
        html.push_str(&format!("<p class=\"meta\">Not computed: {}</p>\n", html_escape(reason)));
        html.push_str("</section>\n");
    }

    // Topics
    if !a.topic_difficulty.is_empty() {
        html.push_str("<section class=\"topics\">\n");
        html.push_str("<h2>Difficulty by topic</h2>\n");
        html.push_str("<table id=\"topics\">\n");
        html.push_str(&sortable_header("topics", &["Topic", "Items", "Mean difficulty"]));
        html.push_str("<tbody>\n");
        for t in &a.topic_difficulty {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.3}</td></tr>\n",
                html_escape(&t.topic),
                html_escape(&t.items.join(", ")),
                t.mean_difficulty
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    if !a.mastery.is_empty() {
        html.push_str("<section class=\"mastery\">\n");
        html.push_str("<h2>Topic mastery</h2>\n");
        html.push_str("<table id=\"mastery\">\n");
        html.push_str(&sortable_header("mastery", &["Examinee", "Mastered", "Needs study"]));
        html.push_str("<tbody>\n");
        for m in &a.mastery {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&m.examinee),
                html_escape(&m.mastered.join(", ")),
                html_escape(&m.needs_study.join(", "))
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // ICCs
    html.push_str("<section class=\"icc\">\n");
    html.push_str("<h2>Item characteristic curves</h2>\n");
    html.push_str("<div class=\"curves\">\n");
    for (i, p) in a.irt.iter().enumerate() {
        let mut curves: Vec<(&IrtItemParameters, &str, &str)> = vec![(p, "all", "#2563eb")];
        let mut legend = String::new();
        if let Some(dif) = &a.dif {
            if let (Some(g1), Some(g2)) = (dif.group1_parameters.get(i), dif.group2_parameters.get(i)) {
                curves.push((g1, dif.groups[0].as_str(), "#16a34a"));
                curves.push((g2, dif.groups[1].as_str(), "#dc2626"));
                legend = format!(
                    "<span style=\"color:#16a34a\">{}</span> / <span style=\"color:#dc2626\">{}</span>",
                    html_escape(&dif.groups[0]),
                    html_escape(&dif.groups[1])
                );
            }
        }
        html.push_str("<figure>\n");
        html.push_str(&generate_icc_chart(&curves, &report.theta_grid));
        html.push_str(&format!(
            "<figcaption>Item {} {}</figcaption>\n",
            html_escape(&p.item),
            legend
        ));
        html.push_str("</figure>\n");
    }
    html.push_str("</div>\n</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote HTML report");
    Ok(())
}

fn sortable_header(table: &str, columns: &[&str]) -> String {
    let mut row = String::from("<thead><tr>");
    for (i, col) in columns.iter().enumerate() {
        row.push_str(&format!(
            "<th onclick=\"sortTable('{table}', {i})\">{}</th>",
            html_escape(col)
        ));
    }
    row.push_str("</tr></thead>\n");
    row
}

/// One SVG plot with a polyline per parameter set, theta on x and P on y.
fn generate_icc_chart(curves: &[(&IrtItemParameters, &str, &str)], grid: &ThetaGrid) -> String {
    let width = 260.0;
    let height = 160.0;
    let pad = 24.0;
    let plot_w = width - 2.0 * pad;
    let plot_h = height - 2.0 * pad;
    let span = (grid.max - grid.min).max(f64::EPSILON);

    let x = |theta: f64| pad + (theta - grid.min) / span * plot_w;
    let y = |p: f64| pad + (1.0 - p) * plot_h;

    let mut svg = format!(
        "<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );
    svg.push_str(&format!(
        "  <rect x=\"{pad}\" y=\"{pad}\" width=\"{plot_w}\" height=\"{plot_h}\" fill=\"none\" stroke=\"currentColor\" stroke-opacity=\"0.3\"/>\n"
    ));
    svg.push_str(&format!(
        "  <line x1=\"{pad}\" y1=\"{mid}\" x2=\"{right}\" y2=\"{mid}\" stroke=\"currentColor\" stroke-opacity=\"0.15\" stroke-dasharray=\"4 3\"/>\n",
        mid = y(0.5),
        right = pad + plot_w
    ));
    svg.push_str(&format!(
        "  <text x=\"{pad}\" y=\"{}\" font-size=\"10\" fill=\"currentColor\">{}</text>\n",
        height - 6.0,
        grid.min
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"currentColor\" text-anchor=\"end\">{}</text>\n",
        pad + plot_w,
        height - 6.0,
        grid.max
    ));

    for (params, label, color) in curves {
        let points: Vec<String> = icc_curve(params, grid)
            .iter()
            .map(|pt| format!("{:.2},{:.2}", x(pt.theta), y(pt.probability)))
            .collect();
        svg.push_str(&format!(
            "  <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"><title>{}</title></polyline>\n",
            color,
            points.join(" "),
            html_escape(label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --warn: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --warn: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.degenerate { background: var(--warn); }
.curves { display: flex; flex-wrap: wrap; gap: 1rem; }
figure { margin: 0; }
figcaption { text-align: center; font-size: 0.85rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 0.5rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent.replace('*', '');
    const vb = b.cells[col].textContent.replace('*', '');
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
