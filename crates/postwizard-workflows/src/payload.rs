use postwizard_types::payload::{MediaPayload, PostPayload};

/// Site settings the payload builders need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site_name: String,
    /// Fully qualified domain, e.g. `example.com`.
    pub domain: String,
    /// Fill image alt text, captions and descriptions.
    pub img_seo_attrs: bool,
    pub post_status: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            domain: String::new(),
            img_seo_attrs: true,
            post_status: "draft".into(),
        }
    }
}

/// A partner video about to be posted.
#[derive(Debug, Clone, Default)]
pub struct VideoPost<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub partner: &'a str,
    pub tracking_url: &'a str,
    pub banner_url: &'a str,
    pub tag_ids: Vec<u64>,
    pub model_ids: Vec<u64>,
    pub category_ids: Option<Vec<u64>>,
}

/// Post with the description and a banner linking to the tracking URL.
pub fn video_post_payload(video: &VideoPost<'_>, site: &SiteConfig) -> PostPayload {
    let alt = if site.img_seo_attrs {
        format!("{} | {} on {}", video.title, video.partner, site.domain)
    } else {
        String::new()
    };
    let content = format!(
        "<p>{}</p><figure class=\"wp-block-image size-large\"><a href=\"{}\"><img decoding=\"async\" src=\"{}\" alt=\"{}\"/></a></figure>",
        video.description, video.tracking_url, video.banner_url, alt
    );

    PostPayload {
        slug: video.slug.to_string(),
        status: site.post_status.clone(),
        post_type: "post".into(),
        title: video.title.to_string(),
        excerpt: format!("<p>{}</p>\n", video.description),
        content,
        featured_media: 0,
        tags: video.tag_ids.clone(),
        pornstars: video.model_ids.clone(),
        categories: video.category_ids.clone(),
    }
}

/// Post whose body is only the description.
pub fn simple_post_payload(
    slug: &str,
    title: &str,
    description: &str,
    tag_ids: Vec<u64>,
    category_ids: Option<Vec<u64>>,
    site: &SiteConfig,
) -> PostPayload {
    PostPayload {
        slug: slug.to_string(),
        status: site.post_status.clone(),
        post_type: "post".into(),
        title: title.to_string(),
        excerpt: format!("<p>{}</p>\n", description),
        content: format!("<p>{}</p>", description),
        featured_media: 0,
        tags: tag_ids,
        pornstars: Vec::new(),
        categories: category_ids,
    }
}

/// Alt text, caption and description for a featured image.
///
/// `flat` sets all three to the same text and wins over everything else.
pub fn media_payload(title: &str, description: &str, site: &SiteConfig, flat: Option<&str>) -> MediaPayload {
    if let Some(text) = flat {
        return MediaPayload {
            alt_text: text.to_string(),
            caption: text.to_string(),
            description: text.to_string(),
        };
    }
    if !site.img_seo_attrs {
        return MediaPayload::default();
    }
    if title == description {
        let on_domain = format!("{} on {}", title, site.domain);
        return MediaPayload {
            alt_text: format!("{} on {}", title, site.site_name),
            caption: on_domain.clone(),
            description: on_domain,
        };
    }
    let text = format!("{} on {} - {}", title, site.domain, description);
    MediaPayload {
        alt_text: text.clone(),
        caption: text.clone(),
        description: text,
    }
}

/// Attributes for the `n`-th image of a photo gallery (1-based).
pub fn gallery_image_payload(gallery_title: &str, n: usize, site: &SiteConfig) -> MediaPayload {
    if !site.img_seo_attrs {
        return MediaPayload::default();
    }
    let text = format!("Photo {} from {}", n, gallery_title);
    MediaPayload {
        alt_text: text.clone(),
        caption: text.clone(),
        description: text,
    }
}
