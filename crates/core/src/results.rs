//! Student result correction.
//!
//! [`ResultEditor`] works on a deep copy of a [`StudentResult`]. Totals are
//! kept in step with the subject rows after every change, and
//! [`ResultEditor::validate`] applies the checks that must pass before the
//! corrected sheet is saved.

use serde::{Deserialize, Deserializer, Serialize};

use crate::collection::{Record, Searchable};
use crate::types::ResultId;

/// A student's published result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResult {
    #[serde(rename = "_id")]
    pub id: ResultId,
    pub result: ResultSheet,
}

impl Record for StudentResult {
    type Id = ResultId;

    fn id(&self) -> &ResultId {
        &self.id
    }
}

impl Searchable for StudentResult {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.result.name, &self.result.roll_no, &self.result.enrollment_no]
    }
}

/// The mark sheet itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSheet {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub roll_no: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub enrollment_no: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub sr_no: String,
    #[serde(default)]
    pub session: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub percentage: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub subjects: Vec<SubjectRow>,
    #[serde(default)]
    pub total_full: u32,
    #[serde(default)]
    pub total_pass: u32,
    #[serde(default)]
    pub total_obt: u32,
}

/// One subject line on a mark sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    pub sno: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full: Option<u32>,
    #[serde(default)]
    pub pass: Option<u32>,
    #[serde(default)]
    pub obtained: Option<u32>,
}

/// Free-text header fields of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetField {
    Name,
    RollNo,
    EnrollmentNo,
    FatherName,
    Course,
    SrNo,
    Session,
    Percentage,
    Grade,
    Status,
}

impl SheetField {
    /// All fields in display order.
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::RollNo,
        Self::EnrollmentNo,
        Self::FatherName,
        Self::Course,
        Self::SrNo,
        Self::Session,
        Self::Percentage,
        Self::Grade,
        Self::Status,
    ];

    /// Form field name, matching the backend's camelCase key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNo => "rollNo",
            Self::EnrollmentNo => "enrollmentNo",
            Self::FatherName => "fatherName",
            Self::Course => "course",
            Self::SrNo => "srNo",
            Self::Session => "session",
            Self::Percentage => "percentage",
            Self::Grade => "grade",
            Self::Status => "status",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::RollNo => "Roll No",
            Self::EnrollmentNo => "Enrollment No",
            Self::FatherName => "Father's Name",
            Self::Course => "Course",
            Self::SrNo => "Sr No",
            Self::Session => "Session",
            Self::Percentage => "Percentage",
            Self::Grade => "Grade",
            Self::Status => "Status",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl ResultSheet {
    #[must_use]
    pub fn field(&self, field: SheetField) -> &str {
        match field {
            SheetField::Name => &self.name,
            SheetField::RollNo => &self.roll_no,
            SheetField::EnrollmentNo => &self.enrollment_no,
            SheetField::FatherName => &self.father_name,
            SheetField::Course => &self.course,
            SheetField::SrNo => &self.sr_no,
            SheetField::Session => &self.session,
            SheetField::Percentage => &self.percentage,
            SheetField::Grade => &self.grade,
            SheetField::Status => &self.status,
        }
    }

    fn field_mut(&mut self, field: SheetField) -> &mut String {
        match field {
            SheetField::Name => &mut self.name,
            SheetField::RollNo => &mut self.roll_no,
            SheetField::EnrollmentNo => &mut self.enrollment_no,
            SheetField::FatherName => &mut self.father_name,
            SheetField::Course => &mut self.course,
            SheetField::SrNo => &mut self.sr_no,
            SheetField::Session => &mut self.session,
            SheetField::Percentage => &mut self.percentage,
            SheetField::Grade => &mut self.grade,
            SheetField::Status => &mut self.status,
        }
    }

    /// Recompute the three totals from the subject rows. Missing marks count
    /// as zero.
    pub fn recompute_totals(&mut self) {
        let sum = |pick: fn(&SubjectRow) -> Option<u32>| {
            self.subjects
                .iter()
                .map(|row| pick(row).unwrap_or(0))
                .fold(0u32, u32::saturating_add)
        };
        let (full, pass, obt) = (sum(|r| r.full), sum(|r| r.pass), sum(|r| r.obtained));
        self.total_full = full;
        self.total_pass = pass;
        self.total_obt = obt;
    }
}

/// The numeric columns of a subject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkColumn {
    Full,
    Pass,
    Obtained,
}

/// Why a corrected sheet cannot be saved yet.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultValidationError {
    #[error("Student name is required")]
    MissingName,
    #[error("Roll No is required")]
    MissingRollNo,
    #[error("At least one subject is required")]
    NoSubjects,
    /// 1-based subject number.
    #[error("Subject {0} is incomplete")]
    IncompleteSubject(usize),
}

/// The body sent with `PUT /results/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultUpdate<'a> {
    pub result: &'a ResultSheet,
}

/// Working copy of a result under correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEditor {
    id: ResultId,
    sheet: ResultSheet,
}

impl ResultEditor {
    /// Open the editor on a deep copy of `record`.
    #[must_use]
    pub fn open(record: &StudentResult) -> Self {
        Self {
            id: record.id.clone(),
            sheet: record.result.clone(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ResultId {
        &self.id
    }

    #[must_use]
    pub const fn sheet(&self) -> &ResultSheet {
        &self.sheet
    }

    pub fn set_field(&mut self, field: SheetField, value: impl Into<String>) {
        *self.sheet.field_mut(field) = value.into();
    }

    /// Rename subject `index` (0-based). Out-of-range indexes are ignored.
    pub fn set_subject_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(row) = self.sheet.subjects.get_mut(index) {
            row.name = name.into();
        }
    }

    /// Set one mark of subject `index` (0-based) and recompute the totals.
    pub fn set_subject_mark(&mut self, index: usize, column: MarkColumn, value: Option<u32>) {
        if let Some(row) = self.sheet.subjects.get_mut(index) {
            match column {
                MarkColumn::Full => row.full = value,
                MarkColumn::Pass => row.pass = value,
                MarkColumn::Obtained => row.obtained = value,
            }
        }
        self.sheet.recompute_totals();
    }

    /// Append an empty subject numbered after the existing ones.
    pub fn add_subject(&mut self) {
        let sno = u32::try_from(self.sheet.subjects.len() + 1).unwrap_or(u32::MAX);
        self.sheet.subjects.push(SubjectRow {
            sno,
            name: String::new(),
            full: Some(0),
            pass: Some(0),
            obtained: Some(0),
        });
        self.sheet.recompute_totals();
    }

    /// Run the save checks in order; the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ResultValidationError`].
    pub fn validate(&self) -> Result<(), ResultValidationError> {
        if self.sheet.name.trim().is_empty() {
            return Err(ResultValidationError::MissingName);
        }
        if self.sheet.roll_no.trim().is_empty() {
            return Err(ResultValidationError::MissingRollNo);
        }
        if self.sheet.subjects.is_empty() {
            return Err(ResultValidationError::NoSubjects);
        }
        for (i, row) in self.sheet.subjects.iter().enumerate() {
            if row.name.trim().is_empty() || row.full.is_none() || row.obtained.is_none() {
                return Err(ResultValidationError::IncompleteSubject(i + 1));
            }
        }
        Ok(())
    }

    /// Validate and borrow the body for the save call.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ResultValidationError`].
    pub fn update(&self) -> Result<ResultUpdate<'_>, ResultValidationError> {
        self.validate()?;
        Ok(ResultUpdate { result: &self.sheet })
    }

    /// The record as it will look once saved.
    #[must_use]
    pub fn to_record(&self) -> StudentResult {
        StudentResult {
            id: self.id.clone(),
            result: self.sheet.clone(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record() -> StudentResult {
        serde_json::from_value(json!({
            "_id": "r1",
            "result": {
                "name": "Asha Verma",
                "rollNo": "2301",
                "enrollmentNo": 99120,
                "fatherName": "R. Verma",
                "course": "MBA",
                "session": "2023-25",
                "percentage": 78.5,
                "grade": "A",
                "status": "PASS",
                "subjects": [
                    {"sno": 1, "name": "Finance", "full": 100, "pass": 40, "obtained": 80},
                    {"sno": 2, "name": "Marketing", "full": 100, "pass": 40, "obtained": 77}
                ],
                "totalFull": 200,
                "totalPass": 80,
                "totalObt": 157
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_tolerant_decoding() {
        let record = record();
        assert_eq!(record.result.enrollment_no, "99120");
        assert_eq!(record.result.percentage, "78.5");
        assert_eq!(record.result.sr_no, "");
    }

    #[test]
    fn test_working_copy_is_independent() {
        let original = record();
        let mut editor = ResultEditor::open(&original);
        editor.set_field(SheetField::Name, "Changed");
        editor.set_subject_mark(0, MarkColumn::Obtained, Some(10));
        assert_eq!(original.result.name, "Asha Verma");
        assert_eq!(original.result.subjects[0].obtained, Some(80));
    }

    #[test]
    fn test_totals_follow_every_change() {
        let mut editor = ResultEditor::open(&record());
        editor.set_subject_mark(1, MarkColumn::Obtained, Some(90));
        assert_eq!(editor.sheet().total_obt, 170);

        editor.add_subject();
        let added = &editor.sheet().subjects[2];
        assert_eq!(added.sno, 3);
        assert_eq!(added.full, Some(0));
        assert_eq!(editor.sheet().total_full, 200);

        editor.set_subject_mark(2, MarkColumn::Full, Some(50));
        editor.set_subject_mark(2, MarkColumn::Pass, Some(20));
        assert_eq!(editor.sheet().total_full, 250);
        assert_eq!(editor.sheet().total_pass, 100);

        editor.set_subject_mark(0, MarkColumn::Full, None);
        assert_eq!(editor.sheet().total_full, 150);
    }

    #[test]
    fn test_validation_order() {
        let mut editor = ResultEditor::open(&record());
        assert_eq!(editor.validate(), Ok(()));

        editor.add_subject();
        assert_eq!(editor.validate(), Err(ResultValidationError::IncompleteSubject(3)));

        editor.set_field(SheetField::RollNo, " ");
        assert_eq!(editor.validate(), Err(ResultValidationError::MissingRollNo));

        editor.set_field(SheetField::Name, "");
        assert_eq!(editor.validate(), Err(ResultValidationError::MissingName));

        let mut empty = ResultEditor::open(&StudentResult {
            id: ResultId::new("r2"),
            result: ResultSheet {
                name: "B".into(),
                roll_no: "1".into(),
                ..ResultSheet::default()
            },
        });
        assert_eq!(empty.validate(), Err(ResultValidationError::NoSubjects));
        empty.add_subject();
        empty.set_subject_name(0, "Law");
        empty.set_subject_mark(0, MarkColumn::Obtained, None);
        assert_eq!(empty.validate(), Err(ResultValidationError::IncompleteSubject(1)));
        assert_eq!(
            ResultValidationError::IncompleteSubject(1).to_string(),
            "Subject 1 is incomplete"
        );
    }

    #[test]
    fn test_update_body() {
        let editor = ResultEditor::open(&record());
        let body = serde_json::to_value(editor.update().unwrap()).unwrap();
        assert_eq!(body["result"]["rollNo"], "2301");
        assert_eq!(body["result"]["totalObt"], 157);
        assert_eq!(body["result"]["subjects"][1]["name"], "Marketing");
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in SheetField::ALL {
            assert_eq!(SheetField::from_key(field.key()), Some(field));
        }
        assert_eq!(SheetField::from_key("unknown"), None);
    }
}
