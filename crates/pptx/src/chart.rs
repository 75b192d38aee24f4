//! Category charts.

use deck_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The plot element a chart kind is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFamily {
    Bar,
    Line,
    Pie,
    Doughnut,
    Area,
    Radar,
}

impl ChartFamily {
    /// Local name of the plot element inside `c:plotArea`.
    pub fn xml_element_name(&self) -> &'static str {
        match self {
            Self::Bar => "barChart",
            Self::Line => "lineChart",
            Self::Pie => "pieChart",
            Self::Doughnut => "doughnutChart",
            Self::Area => "areaChart",
            Self::Radar => "radarChart",
        }
    }

    /// Whether the plot has category and value axes.
    pub fn has_axes(&self) -> bool {
        !matches!(self, Self::Pie | Self::Doughnut)
    }
}

/// How series are combined within a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Standard,
    Clustered,
    Stacked,
    PercentStacked,
}

impl Grouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Clustered => "clustered",
            Self::Stacked => "stacked",
            Self::PercentStacked => "percentStacked",
        }
    }
}

macro_rules! chart_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Supported category chart kinds, identified by names such as
        /// `COLUMN_CLUSTERED`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ChartKind {
            $($variant),+
        }

        impl ChartKind {
            /// Every supported kind.
            pub const ALL: &'static [ChartKind] = &[$(Self::$variant),+];

            /// Identifier used in requests.
            pub fn identifier(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

chart_kinds! {
    ColumnClustered => "COLUMN_CLUSTERED",
    ColumnStacked => "COLUMN_STACKED",
    ColumnStacked100 => "COLUMN_STACKED_100",
    BarClustered => "BAR_CLUSTERED",
    BarStacked => "BAR_STACKED",
    BarStacked100 => "BAR_STACKED_100",
    Line => "LINE",
    LineMarkers => "LINE_MARKERS",
    LineStacked => "LINE_STACKED",
    LineMarkersStacked => "LINE_MARKERS_STACKED",
    LineStacked100 => "LINE_STACKED_100",
    LineMarkersStacked100 => "LINE_MARKERS_STACKED_100",
    Pie => "PIE",
    PieExploded => "PIE_EXPLODED",
    Doughnut => "DOUGHNUT",
    DoughnutExploded => "DOUGHNUT_EXPLODED",
    Area => "AREA",
    AreaStacked => "AREA_STACKED",
    AreaStacked100 => "AREA_STACKED_100",
    Radar => "RADAR",
    RadarMarkers => "RADAR_MARKERS",
    RadarFilled => "RADAR_FILLED",
}

impl ChartKind {
    /// Look a kind up by identifier, ignoring ASCII case.
    pub fn parse(identifier: &str) -> Result<Self> {
        let wanted = identifier.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.identifier().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnsupportedChartKind(identifier.to_string()))
    }

    pub fn family(&self) -> ChartFamily {
        use ChartKind::*;
        match self {
            ColumnClustered | ColumnStacked | ColumnStacked100 | BarClustered | BarStacked
            | BarStacked100 => ChartFamily::Bar,
            Line | LineMarkers | LineStacked | LineMarkersStacked | LineStacked100
            | LineMarkersStacked100 => ChartFamily::Line,
            Pie | PieExploded => ChartFamily::Pie,
            Doughnut | DoughnutExploded => ChartFamily::Doughnut,
            Area | AreaStacked | AreaStacked100 => ChartFamily::Area,
            Radar | RadarMarkers | RadarFilled => ChartFamily::Radar,
        }
    }

    pub fn grouping(&self) -> Grouping {
        use ChartKind::*;
        match self {
            ColumnClustered | BarClustered => Grouping::Clustered,
            ColumnStacked | BarStacked | LineStacked | LineMarkersStacked | AreaStacked => {
                Grouping::Stacked
            }
            ColumnStacked100 | BarStacked100 | LineStacked100 | LineMarkersStacked100
            | AreaStacked100 => Grouping::PercentStacked,
            _ => Grouping::Standard,
        }
    }

    /// `barDir` value for bar-family kinds.
    pub fn bar_direction(&self) -> Option<&'static str> {
        use ChartKind::*;
        match self {
            ColumnClustered | ColumnStacked | ColumnStacked100 => Some("col"),
            BarClustered | BarStacked | BarStacked100 => Some("bar"),
            _ => None,
        }
    }

    /// Whether line and radar series draw point markers.
    pub fn has_markers(&self) -> bool {
        use ChartKind::*;
        matches!(
            self,
            LineMarkers | LineMarkersStacked | LineMarkersStacked100 | RadarMarkers
        )
    }

    /// Whether pie and doughnut slices are pulled apart.
    pub fn is_exploded(&self) -> bool {
        matches!(self, Self::PieExploded | Self::DoughnutExploded)
    }

    /// `radarStyle` value for radar kinds.
    pub fn radar_style(&self) -> Option<&'static str> {
        match self {
            Self::Radar | Self::RadarMarkers => Some("marker"),
            Self::RadarFilled => Some("filled"),
            _ => None,
        }
    }
}

impl Default for ChartKind {
    fn default() -> Self {
        Self::ColumnClustered
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// One named series of values. `None` marks a gap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Category labels plus the series plotted against them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.series.push(ChartSeries {
            name: name.into(),
            values,
        });
    }
}

/// A chart title with an explicit font size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTitle {
    pub text: String,
    pub font_size: f64,
}

/// A chart shape's content.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub data: ChartData,
    pub has_legend: bool,
    pub title: Option<ChartTitle>,
}

impl Chart {
    pub fn new(kind: ChartKind, data: ChartData) -> Self {
        Self {
            kind,
            data,
            has_legend: true,
            title: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ChartKind::parse("COLUMN_CLUSTERED").unwrap(), ChartKind::ColumnClustered);
        assert_eq!(ChartKind::parse("pie").unwrap(), ChartKind::Pie);
        assert_eq!("Line_Markers".parse::<ChartKind>().unwrap(), ChartKind::LineMarkers);
    }

    #[test]
    fn test_unknown_kind() {
        let err = ChartKind::parse("NOT_A_CHART").unwrap_err();
        assert!(matches!(err, Error::UnsupportedChartKind(ref name) if name == "NOT_A_CHART"));
        assert!(ChartKind::parse("").is_err());
        assert!(ChartKind::parse("XY_SCATTER").is_err());
    }

    #[test]
    fn test_identifiers_round_trip() {
        assert_eq!(ChartKind::ALL.len(), 22);
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::parse(kind.identifier()).unwrap(), *kind);
        }
    }

    #[test]
    fn test_kind_properties() {
        assert_eq!(ChartKind::BarStacked.family(), ChartFamily::Bar);
        assert_eq!(ChartKind::BarStacked.bar_direction(), Some("bar"));
        assert_eq!(ChartKind::ColumnStacked100.grouping(), Grouping::PercentStacked);
        assert_eq!(ChartKind::Line.grouping(), Grouping::Standard);
        assert!(!ChartKind::Line.has_markers());
        assert!(ChartKind::LineMarkers.has_markers());
        assert!(ChartKind::DoughnutExploded.is_exploded());
        assert!(!ChartKind::Pie.family().has_axes());
        assert!(ChartKind::RadarFilled.family().has_axes());
        assert_eq!(ChartKind::RadarFilled.radar_style(), Some("filled"));
    }

    #[test]
    fn test_new_chart_shows_legend() {
        let chart = Chart::new(ChartKind::default(), ChartData::new(vec!["A".into()]));
        assert!(chart.has_legend);
        assert!(chart.title.is_none());
    }
}
