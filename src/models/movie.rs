use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const POSTER_FALLBACK: &str = "/no-movie.png";
const NOT_AVAILABLE: &str = "N/A";

/// A movie record as returned by the catalog
///
/// Records are immutable once fetched; a new search replaces them wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Catalog-assigned identifier
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Average rating on a 0-10 scale, zero when nobody has voted
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Explicit `null` is treated like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The catalog reports missing dates as `""`, and occasionally partial dates;
/// both are treated as absent.
fn deserialize_release_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

impl Movie {
    /// Whether the catalog holds a usable rating for this movie
    pub fn is_rated(&self) -> bool {
        self.vote_average > 0.0
    }

    /// Rating with exactly one decimal, or `N/A` when unrated
    pub fn rating_display(&self) -> String {
        if self.is_rated() {
            format!("{:.1}", self.vote_average)
        } else {
            NOT_AVAILABLE.to_string()
        }
    }

    /// Star-prefixed rating literal, e.g. `★ 7.0/10`
    pub fn rating_label(&self) -> Option<String> {
        self.is_rated()
            .then(|| format!("★ {:.1}/10", self.vote_average))
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    pub fn release_year_display(&self) -> String {
        self.release_year()
            .map(|year| year.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// ISO release date, or `fallback` when unknown
    pub fn release_date_or(&self, fallback: &str) -> String {
        self.release_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn language_label(&self) -> String {
        self.language_or(NOT_AVAILABLE)
    }

    /// Upper-cased language code, or `fallback` when unknown
    pub fn language_or(&self, fallback: &str) -> String {
        if self.original_language.trim().is_empty() {
            fallback.to_string()
        } else {
            self.original_language.trim().to_uppercase()
        }
    }

    pub fn overview_display(&self) -> &str {
        self.overview_or("No overview available.")
    }

    pub fn overview_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.overview.trim() {
            "" => fallback,
            overview => overview,
        }
    }

    /// Full poster URL, falling back to the bundled placeholder image
    pub fn poster_url(&self) -> String {
        match self.poster_path.as_deref().map(|p| p.trim_start_matches('/')) {
            Some(path) if !path.is_empty() => format!("{}/{}", POSTER_BASE_URL, path),
            _ => POSTER_FALLBACK.to_string(),
        }
    }
}

/// Normalized outcome of a catalog request that produced a response body
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogPage {
    /// The catalog returned a (possibly empty) result list
    Results(Vec<Movie>),
    /// The catalog answered but flagged the request as failed
    Failed(String),
}

#[cfg(test)]
pub(crate) fn sample_movie(id: u64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        vote_average: 8.4,
        release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
        original_language: "en".to_string(),
        overview: format!("{} overview", title),
        poster_path: Some(format!("/{}.jpg", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_catalog_record() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "vote_average": 8.369,
            "release_date": "2010-07-15",
            "original_language": "en",
            "overview": "Cobb steals secrets.",
            "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
            "popularity": 83.9
        }))
        .unwrap();

        assert_eq!(movie.id, 27205);
        assert_eq!(movie.release_year(), Some(2010));
        assert_eq!(movie.rating_display(), "8.4");
        assert_eq!(
            movie.poster_url(),
            "https://image.tmdb.org/t/p/w500/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg"
        );
    }

    #[test]
    fn test_empty_release_date_is_absent() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 1,
            "title": "Untitled",
            "release_date": "",
            "poster_path": null
        }))
        .unwrap();

        assert_eq!(movie.release_date, None);
        assert_eq!(movie.release_year_display(), "N/A");
        assert_eq!(movie.poster_url(), "/no-movie.png");
        assert_eq!(movie.overview_display(), "No overview available.");
    }

    #[test]
    fn test_rating_label_keeps_one_decimal() {
        let mut movie = sample_movie(1, "Seven");
        movie.vote_average = 7.0;
        assert_eq!(movie.rating_label().as_deref(), Some("★ 7.0/10"));

        movie.vote_average = 6.96;
        assert_eq!(movie.rating_label().as_deref(), Some("★ 7.0/10"));

        movie.vote_average = 0.0;
        assert_eq!(movie.rating_label(), None);
        assert_eq!(movie.rating_display(), "N/A");
    }

    #[test]
    fn test_language_label_is_uppercased() {
        let mut movie = sample_movie(2, "Amelie");
        movie.original_language = "fr".to_string();
        assert_eq!(movie.language_label(), "FR");
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 3,
            "title": null,
            "vote_average": null,
            "release_date": null,
            "original_language": null,
            "overview": null,
            "poster_path": null
        }))
        .unwrap();

        assert_eq!(movie.title, "");
        assert_eq!(movie.rating_display(), "N/A");
        assert_eq!(movie.language_label(), "N/A");
        assert_eq!(movie.overview_display(), "No overview available.");
    }

    #[test]
    fn test_fallbacks_are_caller_supplied() {
        let mut movie = sample_movie(4, "Heat");
        assert_eq!(movie.release_date_or("Not Available"), "2010-07-16");
        assert_eq!(movie.language_or("Not Available"), "EN");
        assert_eq!(movie.overview_or("Not Available"), "Heat overview");

        movie.release_date = None;
        movie.original_language = " ".to_string();
        movie.overview = "\n".to_string();
        assert_eq!(movie.release_date_or("Not Available"), "Not Available");
        assert_eq!(movie.language_or("Not Available"), "Not Available");
        assert_eq!(movie.overview_or("Not Available"), "Not Available");
    }
}
