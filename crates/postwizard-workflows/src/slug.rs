use crate::strings::{clean_partner_tag, join_word_runs, split_char};

/// Words dropped from titles before they go into a slug.
const FILTER_WORDS: [&str; 8] = ["at", "&", "and", "but", "it", "so", "very", "amp"];

/// Order of the slug segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlugLayout {
    /// partner-model-title-studio-content
    #[default]
    Default,
    /// title-partner-model-studio-content
    Reverse,
    /// title-model-content, with the studio standing in for a missing model
    PartnerOut,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlugOptions<'a> {
    pub studio: Option<&'a str>,
    pub layout: SlugLayout,
}

fn title_segment(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| join_word_runs(word, ""))
        .filter(|word| !word.is_empty() && !FILTER_WORDS.contains(&word.as_str()))
        .collect::<Vec<_>>()
        .join("-")
}

fn partner_segment(partner: &str) -> String {
    clean_partner_tag(&partner.to_lowercase())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Model lists come as `"A B, C D"`, `"A B;C D"` and so on. A single
/// name with no other separator than a space is one model.
fn model_segment(models: &str) -> String {
    let sep = match split_char(models) {
        Some(s) if !s.trim().is_empty() => s,
        _ => ".",
    };
    models
        .split(sep)
        .map(|name| join_word_runs(name.trim(), "-"))
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// SEO slug for a post: `make_slug("totico's", Some("Hannah X;Didi Dexter"), "She's insane", "-vid")`
/// gives `toticos-hannah-x-didi-dexter-shes-insane-vid`.
pub fn make_slug(partner: &str, model: Option<&str>, title: &str, content: &str) -> String {
    make_slug_with(partner, model, title, content, SlugOptions::default())
}

pub fn make_slug_with(
    partner: &str,
    model: Option<&str>,
    title: &str,
    content: &str,
    options: SlugOptions<'_>,
) -> String {
    let partner = partner_segment(partner);
    let model = model.map(model_segment).unwrap_or_default();
    let title = title_segment(title);
    let studio = options.studio.map(|s| join_word_runs(s, "-")).unwrap_or_default();
    let content = join_word_runs(content, "-");

    let segments = match options.layout {
        SlugLayout::Default => vec![partner, model, title, studio, content],
        SlugLayout::Reverse => vec![title, partner, model, studio, content],
        SlugLayout::PartnerOut => {
            let middle = if model.is_empty() { studio } else { model };
            vec![title, middle, content]
        }
    };

    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_model_title_content() {
        assert_eq!(
            make_slug(
                "totico's",
                Some("Hannah X;Didi Dexter;Sarah O'Connor"),
                "She's insane and does not dissemble it",
                "-vid",
            ),
            "toticos-hannah-x-didi-dexter-sarah-o-connor-shes-insane-does-not-dissemble-vid"
        );
    }

    #[test]
    fn comma_separated_models() {
        assert_eq!(
            make_slug(
                "Test Patrol",
                Some("Hannah X, Didi Dexter, Sarah O'Connor"),
                "She's insane and I ain't loving it",
                "-vid",
            ),
            "test-patrol-hannah-x-didi-dexter-sarah-o-connor-shes-insane-i-aint-loving-vid"
        );
    }

    #[test]
    fn studio_segment_follows_title() {
        let options = SlugOptions {
            studio: Some("SapphoFilms - By Nikoletta Garian - Real Stoic"),
            layout: SlugLayout::Default,
        };
        assert_eq!(
            make_slug_with("Netherlands", Some("Su Rye"), "she's not so inclined", "-vid", options),
            "netherlands-su-rye-shes-not-inclined-sapphofilms-by-nikoletta-garian-real-stoic-vid"
        );
    }

    #[test]
    fn alternative_layouts() {
        let reverse = SlugOptions {
            studio: None,
            layout: SlugLayout::Reverse,
        };
        assert_eq!(
            make_slug_with("Big Studio", Some("Jane Doe"), "Night at the Lake", "video", reverse),
            "night-the-lake-big-studio-jane-doe-video"
        );

        let partner_out = SlugOptions {
            studio: Some("Indie House"),
            layout: SlugLayout::PartnerOut,
        };
        assert_eq!(
            make_slug_with("Big Studio", None, "Night at the Lake", "video", partner_out),
            "night-the-lake-indie-house-video"
        );
    }

    #[test]
    fn empty_parts_leave_no_dangling_hyphens() {
        assert_eq!(make_slug("", None, "Just a title", ""), "just-a-title");
    }
}
