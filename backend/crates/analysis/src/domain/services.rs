//! Domain Services
//!
//! Pure text processing over analysis results: bullet normalisation,
//! bias-term tagging and highlighting, share copy.

use html_escape::encode_quoted_attribute_to_string;
use regex::{Regex, RegexSet};
use std::sync::LazyLock;

/// Terms reported as tags, in reporting order
pub const EXTRACTED_BIAS_TERMS: &[&str] = &[
    "cognitive bias",
    "logical fallacy",
    "thinking error",
    "cognitive distortion",
    "black and white thinking",
    "catastrophizing",
    "overgeneralization",
    "personalization",
    "emotional reasoning",
    "mental filter",
    "jumping to conclusions",
    "should statements",
    "labeling",
    "magnification",
    "minimization",
    "fortune telling",
    "mind reading",
    "disqualifying the positive",
    "all-or-nothing thinking",
    "filtering",
    "polarized thinking",
];

/// Terms highlighted in rendered history; a superset of the tag list
pub const HIGHLIGHTED_BIAS_TERMS: &[&str] = &[
    "cognitive bias",
    "logical fallacy",
    "thinking error",
    "cognitive distortion",
    "black and white thinking",
    "catastrophizing",
    "overgeneralization",
    "personalization",
    "emotional reasoning",
    "mental filter",
    "jumping to conclusions",
    "should statements",
    "labeling",
    "magnification",
    "minimization",
    "fortune telling",
    "mind reading",
    "disqualifying the positive",
    "all-or-nothing thinking",
    "filtering",
    "polarized thinking",
    "heaven's reward fallacy",
    "control fallacy",
    "fallacy of fairness",
    "blaming",
    "always being right",
    "fallacy of change",
    "global labeling",
    "mislabeling",
    "fallacy of attachment",
    "discounting the positive",
    "dichotomous thinking",
    "arbitrary inference",
    "selective abstraction",
    "over-generalization",
    "maximization",
    "confirmation bias",
    "hindsight bias",
    "self-serving bias",
    "attribution bias",
    "framing effect",
    "anchoring bias",
    "availability heuristic",
    "halo effect",
    "fundamental attribution error",
    "optimism bias",
    "pessimism bias",
    "dunning-kruger effect",
    "actor-observer bias",
    "sunk cost fallacy",
    "false consensus effect",
    "bandwagon effect",
    "self-fulfilling prophecy",
    "negativity bias",
    "positive bias",
    "recency bias",
    "just world hypothesis",
    "spotlight effect",
    "gambler's fallacy",
    "illusory correlation",
    "projection bias",
    "normalcy bias",
    "reactance",
    "regret aversion",
    "status quo bias",
    "outcome bias",
    "moral luck",
    "appeal to authority",
    "appeal to emotion",
    "appeal to ignorance",
    "appeal to nature",
    "appeal to novelty",
    "appeal to tradition",
    "appeal to hypocrisy",
    "straw man fallacy",
    "circular reasoning",
    "ad hominem",
    "slippery slope",
    "false dilemma",
    "hasty generalization",
    "appeal to probability",
    "appeal to force",
    "bandwagon fallacy",
    "no true scotsman",
    "loaded question",
    "ambiguity",
    "perfect solution fallacy",
    "thought-action fusion",
    "compare and despair",
    "cross-examination",
    "excessive apologizing",
    "overvaluing social approval",
    "perfectionism",
    "dismissal of positive",
    "rejecting compliments",
    "ignoring achievements",
    "diminishing success",
    "downplaying positives",
    "disregarding strengths",
    "refusal to accept praise",
    "invalidating positive feedback",
    "overlooking positive aspects",
    "trivializing success",
    "underestimating capabilities",
    "refusing to acknowledge progress",
    "denial of improvement",
    "rejection of positive evidence",
    "devaluing personal qualities",
    "negating positive traits",
    "discrediting positive experiences",
    "diminishing personal worth",
    "invalidating positive results",
    "undermining accomplishments",
    "discarding positive feedback",
    "rejecting evidence of success",
    "dismissing positive qualities",
    "minimizing achievements",
    "refusing recognition",
];

const BIAS_EMOJI: &str = "🧠";
const REFRAME_EMOJI: &str = "✅";
const EMOTION_EMOJI: &str = "😊";
const DEFAULT_EMOJI: &str = "💡";

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*]\s+.+").expect("static regex"));

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Analysis|Reframed Statement):$").expect("static regex")
});

static EXTRACT_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(
        EXTRACTED_BIAS_TERMS
            .iter()
            .map(|term| format!("(?i){}", regex::escape(term))),
    )
    .expect("static regex set")
});

static HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = HIGHLIGHTED_BIAS_TERMS
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("static regex")
});

/// Normalise model output so every content line is an emoji bullet
///
/// Blank lines, existing `•`/`-`/`*` bullets and the two section headings
/// pass through untouched. Other lines are trimmed and prefixed with
/// `• <emoji> `.
pub fn format_analysis_result(raw: &str) -> String {
    raw.trim()
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || HEADING_LINE.is_match(trimmed) || BULLET_LINE.is_match(trimmed)
            {
                return line.to_string();
            }
            format!("• {} {}", emoji_for(trimmed), trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn emoji_for(line: &str) -> &'static str {
    let lower = line.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(&["bias", "distortion", "error", "fallacy"]) {
        BIAS_EMOJI
    } else if mentions(&["reframed", "alternative", "instead"]) {
        REFRAME_EMOJI
    } else if mentions(&["emotion", "feel"]) {
        EMOTION_EMOJI
    } else {
        DEFAULT_EMOJI
    }
}

/// Known bias terms present in `text`, lower-cased, each at most once
pub fn extract_cognitive_biases(text: &str) -> Vec<String> {
    EXTRACT_SET
        .matches(text)
        .into_iter()
        .map(|idx| EXTRACTED_BIAS_TERMS[idx].to_string())
        .collect()
}

/// Render `text` as HTML paragraphs with bias terms wrapped in spans
///
/// Text is escaped including both quote characters; the only markup
/// produced is `<p>` and `<span class="bias-term">`.
pub fn highlight_cognitive_biases(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let mut html = String::with_capacity(line.len() + 7);
            html.push_str("<p>");

            let mut last = 0;
            for m in HIGHLIGHT.find_iter(line) {
                encode_quoted_attribute_to_string(&line[last..m.start()], &mut html);
                html.push_str(r#"<span class="bias-term">"#);
                encode_quoted_attribute_to_string(m.as_str(), &mut html);
                html.push_str("</span>");
                last = m.end();
            }
            encode_quoted_attribute_to_string(&line[last..], &mut html);

            html.push_str("</p>");
            html
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Share copy mentioning up to two detected biases
pub fn shareable_summary(biases: &[String], base_url: &str) -> String {
    let url = base_url.trim_end_matches('/');

    match biases {
        [] => format!("I used Cognovain to analyze my thinking patterns! Check it out at {url}"),
        [only] => format!(
            "I used Cognovain and identified the {only} in my thinking! \
             Improve your thinking at {url}"
        ),
        [first, second, ..] => format!(
            "I used Cognovain and identified cognitive patterns like {first} and {second} \
             in my thinking! Improve your thinking at {url}"
        ),
    }
}
