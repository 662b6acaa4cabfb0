
use super::EmbeddingRecord;
use crate::documents::{DocumentMetadata, Jurisdiction};
use crate::embeddings::Chunk;
use crate::{AdvisorError, Result};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const TABLE_NAME: &str = "chunks";

/// Vector database store using LanceDB for similarity search
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: Option<usize>,
}

/// Search result from vector similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub similarity_score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Open (or create) the LanceDB dataset directory at `db_path`.
    ///
    /// The chunks table is not created here; call [`VectorStore::reset`] before
    /// storing records.
    #[inline]
    pub async fn connect(db_path: &Path) -> Result<Self> {
        debug!("Connecting to LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(db_path).map_err(|e| {
            AdvisorError::Index(format!("Failed to create vector database directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        let mut store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            vector_dimension: None,
        };

        if store.table_exists().await? {
            let dim = store.detect_existing_vector_dimension().await?;
            info!("Opened existing chunks table with {} dimensions", dim);
            store.vector_dimension = Some(dim);
        }

        Ok(store)
    }

    #[inline]
    pub fn vector_dimension(&self) -> Option<usize> {
        self.vector_dimension
    }

    #[inline]
    pub async fn table_exists(&self) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.contains(&self.table_name))
    }

    /// Detect vector dimension from existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize> {
        let table = self.open_table().await?;

        let schema = table
            .schema()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to get table schema: {}", e)))?;

        schema
            .fields()
            .iter()
            .find(|field| field.name() == "vector")
            .and_then(|field| match field.data_type() {
                DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
                _ => None,
            })
            .ok_or_else(|| {
                AdvisorError::Index(
                    "Could not find vector column or determine dimension".to_string(),
                )
            })
    }

    /// Create schema with the specified vector dimension
    fn create_schema(vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("source", DataType::Utf8, false),
            Field::new("jurisdiction", DataType::Utf8, false),
            Field::new("file_path", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
        ]))
    }

    /// Replace the chunks table with an empty one of the given vector dimension
    #[inline]
    pub async fn reset(&mut self, vector_dim: usize) -> Result<()> {
        info!("Recreating chunks table with vector dimension: {}", vector_dim);

        self.drop_table_if_exists().await?;

        self.connection
            .create_empty_table(&self.table_name, Self::create_schema(vector_dim))
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to create table: {}", e)))?;

        self.vector_dimension = Some(vector_dim);
        Ok(())
    }

    /// Append a batch of records to the chunks table
    #[inline]
    pub async fn store_embeddings_batch(&mut self, records: &[EmbeddingRecord]) -> Result<()> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        let vector_dim = self.vector_dimension.ok_or_else(|| {
            AdvisorError::Index("Chunks table has not been created".to_string())
        })?;
        if let Some(record) = records.iter().find(|r| r.dimension() != vector_dim) {
            return Err(AdvisorError::Index(format!(
                "Embedding has {} dimensions but the table expects {}",
                record.dimension(),
                vector_dim
            )));
        }

        debug!("Storing batch of {} embeddings", records.len());

        let record_batch = Self::create_record_batch(records, vector_dim)?;
        let table = self.open_table().await?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to insert embeddings: {}", e)))?;

        Ok(())
    }

    /// Create a RecordBatch from embedding records
    fn create_record_batch(records: &[EmbeddingRecord], vector_dim: usize) -> Result<RecordBatch> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);
        let mut sources = Vec::with_capacity(len);
        let mut jurisdictions = Vec::with_capacity(len);
        let mut file_paths = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);

        for record in records {
            let metadata = &record.chunk.metadata;
            ids.push(record.id.as_str());
            flat_values.extend_from_slice(&record.vector);
            sources.push(metadata.source.as_str());
            jurisdictions.push(metadata.jurisdiction.as_str());
            file_paths.push(metadata.file_path.as_str());
            contents.push(record.chunk.content.as_str());
            chunk_indices.push(u32::try_from(record.chunk.chunk_index).map_err(|_| {
                AdvisorError::Index(format!(
                    "Chunk index {} does not fit the table schema",
                    record.chunk.chunk_index
                ))
            })?);
        }

        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            vector_dim as i32,
            Arc::new(Float32Array::from(flat_values)),
            None,
        )
        .map_err(|e| AdvisorError::Index(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(jurisdictions)),
            Arc::new(StringArray::from(file_paths)),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(chunk_indices)),
        ];

        RecordBatch::try_new(Self::create_schema(vector_dim), arrays)
            .map_err(|e| AdvisorError::Index(format!("Failed to create record batch: {}", e)))
    }

    /// Find the `limit` records closest to `query_vector` by cosine distance.
    ///
    /// Results are ordered by descending similarity, where similarity is `1 - distance`.
    #[inline]
    pub async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        debug!("Searching for similar vectors with limit: {}", limit);

        if limit == 0 {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;
        let results = table
            .vector_search(query_vector)
            .map_err(|e| AdvisorError::Index(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to execute search: {}", e)))?;

        let mut search_results = Self::parse_search_results_stream(results).await?;
        search_results.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        Ok(search_results)
    }

    /// Parse search results from LanceDB stream into SearchResult structs
    async fn parse_search_results_stream(
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>> {
        let mut search_results = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(Self::parse_search_batch(&batch)?);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    /// Parse a single record batch from search results
    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
        let sources = string_column(batch, "source")?;
        let jurisdictions = string_column(batch, "jurisdiction")?;
        let file_paths = string_column(batch, "file_path")?;
        let contents = string_column(batch, "content")?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| AdvisorError::Index("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| AdvisorError::Index("Invalid chunk_index column type".to_string()))?;

        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let results = (0..batch.num_rows())
            .map(|row| {
                let distance =
                    distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

                SearchResult {
                    chunk: Chunk {
                        content: contents.value(row).to_string(),
                        metadata: DocumentMetadata {
                            source: sources.value(row).to_string(),
                            jurisdiction: Jurisdiction::from_label(jurisdictions.value(row)),
                            file_path: file_paths.value(row).to_string(),
                        },
                        chunk_index: chunk_indices.value(row) as usize,
                    },
                    similarity_score: 1.0 - distance,
                    distance,
                }
            })
            .collect();

        Ok(results)
    }

    /// Get the total number of rows in the chunks table, zero when it does not exist
    #[inline]
    pub async fn count_embeddings(&self) -> Result<usize> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        self.open_table()
            .await?
            .count_rows(None)
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to count rows: {}", e)))
    }

    /// Drop the chunks table if it exists
    #[inline]
    pub async fn drop_table_if_exists(&mut self) -> Result<()> {
        if self.table_exists().await? {
            info!("Dropping existing chunks table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| AdvisorError::Index(format!("Failed to drop table: {}", e)))?;
        }

        self.vector_dimension = None;
        Ok(())
    }

    async fn open_table(&self) -> Result<lancedb::Table> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| AdvisorError::Index(format!("Failed to open table: {}", e)))
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AdvisorError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AdvisorError::Index(format!("Invalid {} column type", name)))
}
