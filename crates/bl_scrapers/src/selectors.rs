use bl_core::{Error, Result};
use scraper::{ElementRef, Html, Selector};

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Trimmed text of the first element matching `selector` below `scope`.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Ordered extraction strategies: the first selector that yields an element wins.
#[derive(Debug, Clone)]
pub struct SelectorCascade {
    selectors: Vec<(String, Selector)>,
}

impl SelectorCascade {
    pub fn parse<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        let selectors = selectors
            .iter()
            .map(|css| {
                let css = css.as_ref();
                parse_selector(css).map(|selector| (css.to_string(), selector))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// Tries each selector in order and returns the first one with at least
    /// one element accepted by `keep`, together with those elements.
    pub fn first_match<'s, 'd, F>(&'s self, document: &'d Html, keep: F) -> Option<(&'s str, Vec<ElementRef<'d>>)>
    where
        F: Fn(&ElementRef<'d>) -> bool,
    {
        self.selectors.iter().find_map(|(css, selector)| {
            let elements: Vec<_> = document.select(selector).filter(|el| keep(el)).collect();
            if elements.is_empty() {
                None
            } else {
                Some((css.as_str(), elements))
            }
        })
    }
}
