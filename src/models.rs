use serde::{ Deserialize, Deserializer, Serialize };

/// Row identifier shared by the vector index and the metadata file.
pub type RowId = i64;

/// Id reported by the index for slots it could not fill.
pub const SENTINEL_ID: RowId = -1;

/// One job posting as written by the indexing job.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary", default, deserialize_with = "text_or_number")]
    pub salary: String,
    #[serde(rename = "Skills", default)]
    pub skills: String,
    #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Job URL")]
    pub job_url: String,
    #[serde(rename = "Combined_text", default)]
    pub combined_text: String,
}

/// Raw k-nearest-neighbor answer, best match first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub ids: Vec<RowId>,
}

impl Neighbors {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, RowId)> + '_ {
        self.distances.iter().copied().zip(self.ids.iter().copied())
    }
}

/// A metadata-joined hit with the distance the index reported for it.
#[derive(Debug, Serialize, Clone)]
pub struct RankedJob {
    pub id: RowId,
    pub distance: f32,
    pub job: JobRecord,
}

// Scraped salaries show up both as strings and as bare JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error> where D: Deserializer<'de> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Missing(()) => String::new(),
    })
}
