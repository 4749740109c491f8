//! Keyword rules deciding whether a chart is wanted and which one.

/// Words that mark a question as asking for a visualization.
pub const PLOT_KEYWORDS: [&str; 7] = ["plot", "chart", "graph", "visualize", "histogram", "bar", "show me"];

/// Case-insensitive substring check of the question against [`PLOT_KEYWORDS`].
pub fn detect_plot_needed(question: &str) -> bool {
    let q = question.to_lowercase();
    PLOT_KEYWORDS.iter().any(|kw| q.contains(kw))
}

/// A chart is produced when the question asks for one or the agent's
/// answer mentions a plot.
pub fn plot_requested(question: &str, answer: &str) -> bool {
    detect_plot_needed(question) || answer.to_lowercase().contains("plot")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Bars of `Survived` value counts.
    SurvivalCount,
    /// Bars of passengers per `Pclass`.
    ClassDistribution,
    /// 20-bin histogram of known ages.
    AgeHistogram,
    /// Pie of `Sex` value counts.
    GenderPie,
    /// Distinct values per column.
    UniqueValues,
}

impl ChartKind {
    /// First matching rule wins, so "survival by class" is a survival chart.
    pub fn select(question: &str) -> ChartKind {
        let q = question.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if has(&["survived", "survival"]) {
            ChartKind::SurvivalCount
        } else if has(&["class", "pclass"]) {
            ChartKind::ClassDistribution
        } else if has(&["age"]) {
            ChartKind::AgeHistogram
        } else if has(&["sex", "gender"]) {
            ChartKind::GenderPie
        } else {
            ChartKind::UniqueValues
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::SurvivalCount     => "Survival Count (0 = No, 1 = Yes)",
            ChartKind::ClassDistribution => "Passenger Class Distribution",
            ChartKind::AgeHistogram      => "Age Distribution",
            ChartKind::GenderPie         => "Gender Distribution",
            ChartKind::UniqueValues      => "Unique Values per Column",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_plot_needed() {
        assert!(detect_plot_needed("Show me the ages"));
        assert!(detect_plot_needed("Draw a HISTOGRAM of fares"));
        assert!(detect_plot_needed("bar chart of classes"));
        assert!(!detect_plot_needed("How many passengers survived?"));
    }

    #[test]
    fn test_answer_mentioning_plot_requests_one() {
        assert!(plot_requested("What was the fare spread?", "A plot is required to show this."));
        assert!(!plot_requested("What was the average fare?", "32.20"));
    }

    #[test]
    fn test_select_order() {
        assert_eq!(ChartKind::select("Plot survival by class"), ChartKind::SurvivalCount);
        assert_eq!(ChartKind::select("Who survived?"), ChartKind::SurvivalCount);
        assert_eq!(ChartKind::select("Chart the pclass counts"), ChartKind::ClassDistribution);
        assert_eq!(ChartKind::select("Histogram of passenger ages"), ChartKind::AgeHistogram);
        assert_eq!(ChartKind::select("Gender split as a chart"), ChartKind::GenderPie);
        assert_eq!(ChartKind::select("Show me the sex ratio"), ChartKind::GenderPie);
        assert_eq!(ChartKind::select("Visualize the fares"), ChartKind::UniqueValues);
    }

    #[test]
    fn test_age_matches_as_substring() {
        // "average" contains "age"
        assert_eq!(ChartKind::select("Plot the average fare"), ChartKind::AgeHistogram);
    }
}
