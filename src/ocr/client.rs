// OCR/QRサービスのHTTPクライアント: multipartアップロード + リトライ

use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use reqwest::blocking::multipart;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SanitizeError;
use crate::ocr::{OcrDocument, OcrPage, QrDetection};

/// サービス応答のエンベロープ。
///
/// 成功時は`success`配列にアップロードしたファイルごとの結果が入る。
#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: Option<Vec<FileResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileResult {
    pages: Vec<OcrPage>,
    #[serde(rename = "allqrResults", default)]
    qr_results: Vec<QrDetection>,
}

/// 外部OCR/QRサービスへの同期クライアント。
///
/// PDFバイト列をmultipartでPOSTし、ページごとの単語ボックスと
/// QR検出結果を受け取る。ネットワーク障害・非成功応答・不正な
/// ペイロードはすべてOcrServiceErrorとして表面化する。
pub struct OcrClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl OcrClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> crate::error::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// PDF1件分のOCR/QR抽出を1回実行する。
    ///
    /// document_idを渡すと`id`クエリパラメータとしてサービスに
    /// 転送される（サービス側の結果ラベリングに使われる）。
    pub fn extract(
        &self,
        pdf_bytes: &[u8],
        filename: &str,
        document_id: Option<&str>,
    ) -> crate::error::Result<OcrDocument> {
        let part = multipart::Part::bytes(pdf_bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("files", part);

        let mut request = self.http.post(&self.endpoint).multipart(form);
        if let Some(id) = document_id {
            request = request.query(&[("id", id)]);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SanitizeError::ocr_service(format!(
                "OCR service returned {status}"
            )));
        }

        let body = response.text()?;
        let document = parse_upload_response(&body)?;
        debug!(
            pages = document.pages.len(),
            qr_detections = document.qr_detections.len(),
            "OCR extraction complete"
        );
        Ok(document)
    }

    /// extractを指数バックオフ付きでリトライする。
    ///
    /// max_retriesは初回試行を除いた再試行回数の上限。
    pub fn extract_with_retry(
        &self,
        pdf_bytes: &[u8],
        filename: &str,
        document_id: Option<&str>,
        max_retries: u32,
    ) -> crate::error::Result<OcrDocument> {
        let backoff = ExponentialBuilder::default().with_max_times(max_retries as usize);

        (|| self.extract(pdf_bytes, filename, document_id))
            .retry(backoff)
            .notify(|err: &SanitizeError, delay: Duration| {
                warn!("OCR request failed ({err}), retrying in {delay:?}");
            })
            .call()
    }
}

/// サービス応答のJSONエンベロープをOcrDocumentに変換する。
///
/// ページはファイル結果をまたいで連結される（サービスはアップロード
/// したファイルごとに1エントリを返す）。QR検出は先頭のファイル結果
/// から取る。
pub fn parse_upload_response(body: &str) -> crate::error::Result<OcrDocument> {
    let payload: UploadResponse = serde_json::from_str(body)?;

    if let Some(message) = payload.error {
        return Err(SanitizeError::ocr_service(format!(
            "OCR service reported failure: {message}"
        )));
    }

    let results = payload
        .success
        .filter(|r| !r.is_empty())
        .ok_or_else(|| SanitizeError::ocr_service("OCR response contained no results"))?;

    let mut pages = Vec::new();
    let mut qr_detections = Vec::new();
    for (index, file_result) in results.into_iter().enumerate() {
        if index == 0 {
            qr_detections = file_result.qr_results;
        }
        pages.extend(file_result.pages);
    }

    Ok(OcrDocument {
        pages,
        qr_detections,
    })
}
