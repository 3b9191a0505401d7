use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::audio::domain::segment::Segment;
use crate::shared::constants::HTTP_CONNECT_TIMEOUT_SECS;
use crate::transcription::domain::speech_recognizer::{RecognitionError, SpeechRecognizer};

use super::wav_encoder;

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Speech recognition over an OpenAI-compatible `/audio/transcriptions`
/// endpoint.
///
/// Each segment is encoded to an in-memory WAV and uploaded as multipart
/// form data. Both the connect and the overall request are bounded by
/// timeouts, so no call can hang a worker indefinitely. Transport faults,
/// throttling and 5xx responses map to the transient failure class; other
/// non-success responses map to service errors carrying the server's
/// message. An empty transcript comes back as `Ok("")` and is left to the
/// caller's low-confidence policy.
pub struct HttpSpeechRecognizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    language: Option<String>,
}

impl HttpSpeechRecognizer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        language: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/audio/transcriptions", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            language,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SpeechRecognizer for HttpSpeechRecognizer {
    fn transcribe(&self, segment: &Segment) -> Result<String, RecognitionError> {
        let wav_data = wav_encoder::encode(segment)
            .map_err(|e| RecognitionError::Service(format!("wav encoding failed: {e}")))?;

        let audio_part = Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| RecognitionError::Service(e.to_string()))?;

        let mut form = Form::new()
            .part("file", audio_part)
            .text("model", self.model.clone())
            .text("response_format", "json")
            .text("temperature", "0");
        if let Some(ref language) = self.language {
            form = form.text("language", language.clone());
        }

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                RecognitionError::Transient(e.to_string())
            } else {
                RecognitionError::Service(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
        {
            return Err(RecognitionError::Transient(format!(
                "service returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RecognitionError::Service(format!(
                "service returned {status}: {detail}"
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .map_err(|e| RecognitionError::Service(format!("invalid response body: {e}")))?;
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn short_segment() -> Segment {
        Segment::new(vec![0.1; 1600], 16000, 0, 100)
    }

    fn recognizer_for(port: u16) -> HttpSpeechRecognizer {
        HttpSpeechRecognizer::new(
            &format!("http://127.0.0.1:{port}/v1/"),
            Some("test-key".to_string()),
            "whisper-1",
            Some("en".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    /// Serves exactly one request, captures it, and replies with a canned
    /// response.
    fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];

            // Read until the end of the headers.
            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                received.extend_from_slice(&chunk[..n]);
                if let Some(pos) = received
                    .windows(4)
                    .position(|window| window == b"\r\n\r\n")
                {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&received[..header_end]).to_string();
            let content_length: usize = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            while received.len() < header_end + content_length {
                let n = stream.read(&mut chunk).unwrap();
                received.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();

            String::from_utf8_lossy(&received).to_string()
        });

        (port, handle)
    }

    #[test]
    fn test_successful_transcription_parses_text() {
        let (port, server) = one_shot_server("200 OK", r#"{"text": "hello from the wire"}"#);
        let recognizer = recognizer_for(port);

        let text = recognizer.transcribe(&short_segment()).unwrap();
        assert_eq!(text, "hello from the wire");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/audio/transcriptions"));
        assert!(request.contains("Bearer test-key"));
        assert!(request.contains("name=\"model\""));
        assert!(request.contains("whisper-1"));
        assert!(request.contains("name=\"language\""));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("audio.wav"));
    }

    #[test]
    fn test_server_error_maps_to_transient() {
        let (port, server) = one_shot_server("500 Internal Server Error", "{}");
        let recognizer = recognizer_for(port);

        let err = recognizer.transcribe(&short_segment()).unwrap_err();
        assert!(matches!(err, RecognitionError::Transient(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_throttling_maps_to_transient() {
        let (port, server) = one_shot_server("429 Too Many Requests", "{}");
        let recognizer = recognizer_for(port);

        let err = recognizer.transcribe(&short_segment()).unwrap_err();
        assert!(matches!(err, RecognitionError::Transient(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_client_error_maps_to_service_with_message() {
        let (port, server) = one_shot_server(
            "400 Bad Request",
            r#"{"error": {"message": "model not found"}}"#,
        );
        let recognizer = recognizer_for(port);

        let err = recognizer.transcribe(&short_segment()).unwrap_err();
        match err {
            RecognitionError::Service(message) => assert!(message.contains("model not found")),
            other => panic!("expected service error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_service_maps_to_transient() {
        // Nothing listens on this port; connection is refused immediately.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let recognizer = recognizer_for(port);
        let err = recognizer.transcribe(&short_segment()).unwrap_err();
        assert!(matches!(err, RecognitionError::Transient(_)));
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let recognizer = HttpSpeechRecognizer::new(
            "https://api.example.com/v1/",
            None,
            "whisper-1",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            recognizer.endpoint(),
            "https://api.example.com/v1/audio/transcriptions"
        );
    }
}
