use std::collections::HashSet;

use chrono::Utc;
use common::review_job::{ReviewJob, ReviewNarrative, new_job_id};
use common::storage::{BlobPath, BlobStore, StorageError};
use common::{DocumentStatus, ReviewStatus};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::entity::{candidate, design_document, design_review};
use crate::error::AppError;
use crate::models::candidate::validate_candidate;
use crate::models::review::FileReport;
use crate::utils::filename::{media_type_of, sanitize_upload_name};

use super::snapshot;

/// Blob directory for uploaded design documents.
pub const DOCUMENT_DIR: &str = "design_documents";

/// Where a review's upload is stored: `design_documents/{review_id}/{file_name}`.
pub fn document_path(review_id: i32, file_name: &str) -> Result<BlobPath, StorageError> {
    BlobPath::join(&format!("{DOCUMENT_DIR}/{review_id}"), file_name)
}

/// Who the review belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateRef {
    Existing(i32),
    New { name: String, designation: String },
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client. `None` if the part had no filename.
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub candidate: CandidateRef,
    pub narrative: ReviewNarrative,
    pub files: Vec<UploadedFile>,
}

/// Accumulates multipart text fields into an [`IntakeRequest`].
#[derive(Debug, Default)]
pub struct IntakeForm {
    candidate_id: Option<String>,
    candidate_name: Option<String>,
    candidate_designation: Option<String>,
    narrative: ReviewNarrative,
    files: Vec<UploadedFile>,
}

impl IntakeForm {
    /// Record a text field. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "candidate_id" => self.candidate_id = Some(value),
            "candidate_name" => self.candidate_name = Some(value),
            "candidate_designation" => self.candidate_designation = Some(value),
            "problem_description" => self.narrative.problem_description = value,
            "proposed_architecture" => self.narrative.proposed_architecture = value,
            "design_tradeoffs" => self.narrative.design_tradeoffs = value,
            "scalability" => self.narrative.scalability = value,
            "security_measures" => self.narrative.security_measures = value,
            "maintainability" => self.narrative.maintainability = value,
            _ => {}
        }
    }

    pub fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Whether `name` is a narrative or candidate text field.
    pub fn is_text_field(name: &str) -> bool {
        matches!(
            name,
            "candidate_id"
                | "candidate_name"
                | "candidate_designation"
                | "problem_description"
                | "proposed_architecture"
                | "design_tradeoffs"
                | "scalability"
                | "security_measures"
                | "maintainability"
        )
    }

    pub fn into_request(self) -> Result<IntakeRequest, AppError> {
        let candidate_id = self
            .candidate_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let candidate = match (candidate_id, self.candidate_name, self.candidate_designation) {
            (Some(id), _, _) => CandidateRef::Existing(id.parse().map_err(|_| {
                AppError::Validation(format!("candidate_id '{id}' is not a valid id"))
            })?),
            (None, Some(name), Some(designation)) => {
                validate_candidate(&name, &designation)?;
                CandidateRef::New {
                    name: name.trim().to_string(),
                    designation: designation.trim().to_string(),
                }
            }
            _ => {
                return Err(AppError::Validation(
                    "Either candidate_id or both candidate_name and candidate_designation are required"
                        .into(),
                ));
            }
        };

        Ok(IntakeRequest {
            candidate,
            narrative: self.narrative,
            files: self.files,
        })
    }
}

pub struct IntakeResult {
    pub review: design_review::Model,
    pub documents: Vec<design_document::Model>,
    pub files: Vec<FileReport>,
    /// The single question generation job for this submission, to enqueue after return.
    pub job: ReviewJob,
}

/// Create a review, store its documents and prepare its generation job.
///
/// The review row is committed before any file is touched. Each file then
/// succeeds or fails on its own and is reported in `files`.
#[instrument(skip_all, fields(files = request.files.len()))]
pub async fn submit_review(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    request: IntakeRequest,
) -> Result<IntakeResult, AppError> {
    let now = Utc::now();
    let job_id = new_job_id();

    let txn = db.begin().await?;

    let candidate_id = match request.candidate {
        CandidateRef::Existing(id) => {
            candidate::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("Candidate not found".into()))?
                .id
        }
        CandidateRef::New { name, designation } => {
            let model = candidate::ActiveModel {
                name: Set(name),
                designation: Set(designation),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            model.id
        }
    };

    let narrative = request.narrative;
    let review = design_review::ActiveModel {
        problem_description: Set(narrative.problem_description),
        proposed_architecture: Set(narrative.proposed_architecture),
        design_tradeoffs: Set(narrative.design_tradeoffs),
        scalability: Set(narrative.scalability),
        security_measures: Set(narrative.security_measures),
        maintainability: Set(narrative.maintainability),
        status: Set(ReviewStatus::Pending),
        overall_score: Set(None),
        active_job_id: Set(Some(job_id.clone())),
        retry_count: Set(0),
        error_code: Set(None),
        error_message: Set(None),
        candidate_id: Set(candidate_id),
        submitted_at: Set(now),
        status_changed_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(review_id = review.id, candidate_id, "Design review created");

    let mut documents = Vec::new();
    let mut files = Vec::with_capacity(request.files.len());
    let mut taken = HashSet::new();
    for upload in request.files {
        let label = upload.file_name.clone().unwrap_or_default();
        match store_document(db, blobs, review.id, upload, &mut taken).await {
            Ok(document) => {
                files.push(FileReport::stored(label, document.id));
                documents.push(document);
            }
            Err(reason) => {
                warn!(review_id = review.id, file = %label, %reason, "Document not stored");
                files.push(FileReport::failed(label, reason));
            }
        }
    }

    let job = snapshot::generation_job(db, &review, job_id).await?;

    Ok(IntakeResult {
        review,
        documents,
        files,
        job,
    })
}

/// Write one upload to the blob store and record it. Errors are user-facing reasons.
///
/// `taken` holds the names already stored for this review; a repeat is refused
/// instead of overwriting the earlier file.
async fn store_document(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    review_id: i32,
    upload: UploadedFile,
    taken: &mut HashSet<String>,
) -> Result<design_document::Model, String> {
    let raw_name = upload
        .file_name
        .ok_or_else(|| "File field must have a filename".to_string())?;
    let file_name = sanitize_upload_name(&raw_name).map_err(|e| e.to_string())?;
    if taken.contains(&file_name) {
        return Err(format!("Duplicate file name: {file_name}"));
    }
    let path = document_path(review_id, &file_name).map_err(|e| e.to_string())?;

    let stored = blobs
        .put(&path, &upload.data)
        .await
        .map_err(|e| format!("Failed to store file: {e}"))?;

    let now = Utc::now();
    let document = design_document::ActiveModel {
        path: Set(stored.path.as_str().to_string()),
        original_name: Set(file_name.clone()),
        media_type: Set(media_type_of(&file_name)),
        size: Set(stored.size as i64),
        content_hash: Set(stored.content_hash.to_hex()),
        status: Set(DocumentStatus::Pending),
        review_id: Set(review_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        warn!(review_id, error = %e, "Failed to record stored document");
        "Failed to record document".to_string()
    })?;

    taken.insert(file_name);
    Ok(document)
}
