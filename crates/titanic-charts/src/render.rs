//! Chart drawing into an in-memory RGB buffer and PNG encoding.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use titanic_config::ChartConfig;
use titanic_data::{Column, Dataset};

use crate::error::ChartError;
use crate::fonts::{self, FONT_FAMILY};
use crate::heuristic::ChartKind;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
const SURVIVAL_COLORS: [RGBColor; 2] = [RED, GREEN];
const PIE_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];
const AGE_BINS: usize = 20;
const TITLE_SIZE: u32 = 26;

/// Renders one [`ChartKind`] of the passenger table to a PNG.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    text: bool,
}

impl ChartRenderer {
    /// A renderer that draws no text.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(64), height: height.max(64), text: false }
    }

    /// Size from the `[charts]` section; text is enabled when a font
    /// could be registered.
    pub fn from_config(config: &ChartConfig) -> Self {
        let text = fonts::ensure_font(config.font_path.as_deref());
        Self { text, ..Self::new(config.width, config.height) }
    }

    pub fn draws_text(&self) -> bool { self.text }

    pub fn size(&self) -> (u32, u32) { (self.width, self.height) }

    pub fn render_png(&self, kind: ChartKind, dataset: &Dataset) -> Result<Vec<u8>, ChartError> {
        let (width, height) = (self.width, self.height);
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            match kind {
                ChartKind::SurvivalCount => {
                    let bars = counts_of(dataset, Column::Survived, false);
                    self.draw_bars(&root, kind, "Survived", "Count", &bars, &SURVIVAL_COLORS)?;
                }
                ChartKind::ClassDistribution => {
                    let bars = counts_of(dataset, Column::Pclass, true);
                    self.draw_bars(&root, kind, "Class", "Count", &bars, &[BAR_BLUE])?;
                }
                ChartKind::AgeHistogram => self.draw_age_histogram(&root, dataset)?,
                ChartKind::GenderPie => self.draw_gender_pie(&root, dataset)?,
                ChartKind::UniqueValues => {
                    let bars: Vec<(String, u32)> = dataset
                        .nunique()
                        .into_iter()
                        .map(|(c, n)| (c.to_string(), n as u32))
                        .collect();
                    self.draw_bars(&root, kind, "Column", "Unique values", &bars, &[BAR_BLUE])?;
                }
            }
            root.present()?;
        }
        debug!(?kind, width, height, text = self.text, "Chart rendered");
        encode_png(pixels, width, height)
    }

    pub fn render_base64(&self, kind: ChartKind, dataset: &Dataset) -> Result<String, ChartError> {
        Ok(STANDARD.encode(self.render_png(kind, dataset)?))
    }

    fn draw_bars(
        &self,
        root: &Area<'_>,
        kind: ChartKind,
        x_desc: &str,
        y_desc: &str,
        bars: &[(String, u32)],
        colors: &[RGBColor],
    ) -> Result<(), ChartError> {
        if bars.is_empty() {
            return Err(ChartError::NoData(format!("{kind:?} has no values")));
        }
        let x_max = (bars.len() as u32).saturating_sub(1).max(1);
        let y_max = bars.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let y_top = (y_max as f64 * 1.1).ceil() as u32 + 1;

        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if self.text {
            builder
                .caption(kind.title(), (FONT_FAMILY, TITLE_SIZE).into_font())
                .x_label_area_size(40)
                .y_label_area_size(60);
        }
        let mut chart = builder.build_cartesian_2d((0u32..x_max).into_segmented(), 0u32..y_top)?;

        if self.text {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(x_desc)
                .y_desc(y_desc)
                .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                    SegmentValue::CenterOf(i) => bars
                        .get(*i as usize)
                        .map(|(label, _)| label.clone())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .draw()?;
        }

        for (i, (_, count)) in bars.iter().enumerate() {
            let color = colors[i % colors.len()];
            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(15)
                    .data([(i as u32, *count)]),
            )?;
        }
        Ok(())
    }

    fn draw_age_histogram(&self, root: &Area<'_>, dataset: &Dataset) -> Result<(), ChartError> {
        let ages = dataset.numeric_values(Column::Age);
        let (lo, hi) = ages
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| (lo.min(a), hi.max(a)));
        if ages.is_empty() {
            return Err(ChartError::NoData("no known ages".to_string()));
        }

        let bins = age_bins(&ages, lo, hi);
        let width = bin_width(lo, hi);
        let y_top = bins.iter().copied().max().unwrap_or(0) + 1;

        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if self.text {
            builder
                .caption(ChartKind::AgeHistogram.title(), (FONT_FAMILY, TITLE_SIZE).into_font())
                .x_label_area_size(40)
                .y_label_area_size(60);
        }
        let mut chart = builder.build_cartesian_2d(lo..lo + width * AGE_BINS as f64, 0u32..y_top)?;

        if self.text {
            chart.configure_mesh().x_desc("Age").y_desc("Frequency").draw()?;
        }

        let edges = |i: usize| (lo + width * i as f64, lo + width * (i + 1) as f64);
        chart.draw_series(bins.iter().enumerate().map(|(i, &n)| {
            let (x0, x1) = edges(i);
            Rectangle::new([(x0, 0u32), (x1, n)], BAR_BLUE.filled())
        }))?;
        chart.draw_series(bins.iter().enumerate().filter(|(_, n)| **n > 0).map(|(i, &n)| {
            let (x0, x1) = edges(i);
            Rectangle::new([(x0, 0u32), (x1, n)], WHITE.stroke_width(1))
        }))?;
        Ok(())
    }

    fn draw_gender_pie(&self, root: &Area<'_>, dataset: &Dataset) -> Result<(), ChartError> {
        let slices = counts_of(dataset, Column::Sex, false);
        let total: u32 = slices.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return Err(ChartError::NoData("no known sexes".to_string()));
        }

        let (w, h) = root.dim_in_pixel();
        let title_h = if self.text { 50 } else { 0 };
        let center = (w as i32 / 2, (h as i32 + title_h) / 2);
        let radius = ((w.min(h) as i32 - title_h) / 2 - 30).max(10) as f64;

        let point = |angle: f64, r: f64| -> (i32, i32) {
            let rad = angle.to_radians();
            (center.0 + (r * rad.cos()).round() as i32, center.1 - (r * rad.sin()).round() as i32)
        };
        // counter-clockwise from 3 o'clock
        let mut start = 0.0_f64;
        for (i, (label, count)) in slices.iter().enumerate() {
            let sweep = 360.0 * *count as f64 / total as f64;
            let steps = sweep.ceil().max(1.0) as usize;
            let mut points = vec![center];
            points.extend((0..=steps).map(|s| point(start + sweep * s as f64 / steps as f64, radius)));
            root.draw(&Polygon::new(points, PIE_COLORS[i % PIE_COLORS.len()].filled()))?;

            if self.text {
                let label_style = TextStyle::from((FONT_FAMILY, 18).into_font())
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let mid = start + sweep / 2.0;
                let pct = 100.0 * *count as f64 / total as f64;
                root.draw(&Text::new(format!("{pct:.1}%"), point(mid, radius * 0.6), label_style.clone()))?;
                root.draw(&Text::new(label.clone(), point(mid, radius * 1.12), label_style))?;
            }
            start += sweep;
        }

        if self.text {
            let title_style = TextStyle::from((FONT_FAMILY, TITLE_SIZE).into_font())
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(ChartKind::GenderPie.title(), (w as i32 / 2, 12), title_style))?;
        }
        Ok(())
    }
}

/// Value counts of a column as bar labels. `by_key` sorts by value instead
/// of by frequency.
fn counts_of(dataset: &Dataset, column: Column, by_key: bool) -> Vec<(String, u32)> {
    let mut counts = dataset.value_counts(column);
    if by_key {
        counts.sort_by(|a, b| a.0.sort_cmp(&b.0));
    }
    counts.into_iter().map(|(v, n)| (v.to_string(), n as u32)).collect()
}

fn bin_width(lo: f64, hi: f64) -> f64 {
    if hi > lo { (hi - lo) / AGE_BINS as f64 } else { 1.0 }
}

/// Equal-width bins over `[lo, hi]`; the maximum lands in the last bin.
fn age_bins(ages: &[f64], lo: f64, hi: f64) -> [u32; AGE_BINS] {
    let width = bin_width(lo, hi);
    let mut bins = [0u32; AGE_BINS];
    for &age in ages {
        let idx = (((age - lo) / width) as usize).min(AGE_BINS - 1);
        bins[idx] += 1;
    }
    bins
}

fn encode_png(pixels: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let img = RgbImage::from_raw(width, height, pixels)
        .ok_or(ChartError::BufferSize { width, height })?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use titanic_test_utils::SAMPLE_CSV;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE_CSV.as_bytes(), "t.csv").unwrap()
    }

    #[test]
    fn test_every_kind_renders_a_png() {
        let ds = sample();
        let renderer = ChartRenderer::new(800, 500);
        for kind in [
            ChartKind::SurvivalCount,
            ChartKind::ClassDistribution,
            ChartKind::AgeHistogram,
            ChartKind::GenderPie,
            ChartKind::UniqueValues,
        ] {
            let png = renderer.render_png(kind, &ds).unwrap();
            assert_eq!(&png[..8], &PNG_SIGNATURE, "{kind:?}");
            let decoded = image::load_from_memory(&png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (800, 500));
        }
    }

    #[test]
    fn test_text_charts_render_when_a_font_is_found() {
        let renderer = ChartRenderer::from_config(&ChartConfig::default());
        if !renderer.draws_text() {
            // no system font on this machine
            return;
        }
        assert!(fonts::registered_font().is_some());
        assert_eq!(renderer.size(), (800, 500));

        let ds = sample();
        for kind in [
            ChartKind::SurvivalCount,
            ChartKind::ClassDistribution,
            ChartKind::AgeHistogram,
            ChartKind::GenderPie,
            ChartKind::UniqueValues,
        ] {
            let png = renderer.render_png(kind, &ds).unwrap();
            assert_eq!(&png[..8], &PNG_SIGNATURE, "{kind:?}");
        }
    }

    #[test]
    fn test_base64_decodes_to_png() {
        let b64 = ChartRenderer::new(320, 200).render_base64(ChartKind::GenderPie, &sample()).unwrap();
        let bytes = STANDARD.decode(b64).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_survival_bars_use_red_then_green() {
        let png = ChartRenderer::new(400, 300).render_png(ChartKind::SurvivalCount, &sample()).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgb8();
        let has = |rgb: [u8; 3]| img.pixels().any(|p| p.0 == rgb);
        assert!(has([255, 0, 0]));
        assert!(has([0, 255, 0]));
    }

    #[test]
    fn test_class_bars_sorted_by_class() {
        let bars = counts_of(&sample(), Column::Pclass, true);
        assert_eq!(bars, vec![("1".into(), 4), ("2".into(), 3), ("3".into(), 13)]);
    }

    #[test]
    fn test_age_bins_cover_all_known_ages() {
        let ds = sample();
        let ages = ds.numeric_values(Column::Age);
        let bins = age_bins(&ages, 2.0, 58.0);
        assert_eq!(bins.iter().sum::<u32>(), 17);
        assert_eq!(bins[0], 3); // ages 2, 2 and 4
        assert_eq!(bins[AGE_BINS - 1], 1); // the 58-year-old
    }

    #[test]
    fn test_empty_table_has_nothing_to_plot() {
        let header = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";
        let ds = Dataset::from_reader(header.as_bytes(), "empty.csv").unwrap();
        let renderer = ChartRenderer::new(200, 200);
        assert!(matches!(renderer.render_png(ChartKind::AgeHistogram, &ds), Err(ChartError::NoData(_))));
        assert!(matches!(renderer.render_png(ChartKind::SurvivalCount, &ds), Err(ChartError::NoData(_))));
        assert!(matches!(renderer.render_png(ChartKind::GenderPie, &ds), Err(ChartError::NoData(_))));
    }
}
