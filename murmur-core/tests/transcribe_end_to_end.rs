//! Full-path integration tests: resource file on disk ─► pipeline ─► text.

use std::path::PathBuf;
use std::sync::Arc;

use murmur_core::inference::StubEngine;
use murmur_core::pipeline::FeaturePipeline;
use murmur_core::resource;
use murmur_core::spectrogram::{N_FREQS, N_MELS, SAMPLE_RATE};
use murmur_core::vocab::LanguageMode;
use murmur_core::{EngineHandle, MelFilterBank};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("murmur-{}-{name}", std::process::id()))
}

fn write_resource(path: &PathBuf, words: &[&str]) {
    let filters =
        MelFilterBank::new(N_MELS, N_FREQS, vec![0.02; N_MELS * N_FREQS]).unwrap();
    let file = std::fs::File::create(path).unwrap();
    let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    resource::write(std::io::BufWriter::new(file), &filters, &words).unwrap();
}

#[test]
fn transcribes_scripted_tokens_from_a_disk_resource() {
    let path = temp_path("e2e-english.bin");
    write_resource(&path, &["good", " morning", "!"]);

    let resources = Arc::new(resource::load(&path, LanguageMode::English).unwrap());
    std::fs::remove_file(&path).ok();

    let eot = resources.vocab.special().eot;
    let engine = EngineHandle::new(StubEngine::repeating(vec![0, 1, 2, eot]));
    let pipeline = FeaturePipeline::new(resources, engine, 4);

    let samples = vec![0.05f32; SAMPLE_RATE as usize]; // one second
    let out = pipeline.transcribe(&samples).unwrap();
    assert_eq!(out.text, "good morning!");
    assert_eq!(out.task, None);
}

#[test]
fn multilingual_resource_shifts_control_tokens() {
    let path = temp_path("e2e-multilingual.bin");
    write_resource(&path, &["hal", "lo"]);

    let resources = Arc::new(resource::load(&path, LanguageMode::Multilingual).unwrap());
    std::fs::remove_file(&path).ok();
    let special = resources.vocab.special();
    assert_eq!(special.eot, 50_257);
    assert_eq!(special.transcribe, 50_260);

    let engine = EngineHandle::new(StubEngine::repeating(vec![
        special.sot,
        special.transcribe,
        0,
        1,
        special.eot,
    ]));
    let pipeline = FeaturePipeline::new(resources, engine, 2);

    let out = pipeline.transcribe(&[0.0; 16_000]).unwrap();
    assert_eq!(out.text, "hallo");
    assert_eq!(
        out.task,
        Some(murmur_core::vocab::decoder::TaskHint::Transcribe)
    );
}

#[test]
fn transcribe_file_reads_a_wav_from_disk() {
    let resource_path = temp_path("e2e-wav-resource.bin");
    write_resource(&resource_path, &["ok"]);
    let resources = Arc::new(resource::load(&resource_path, LanguageMode::English).unwrap());
    std::fs::remove_file(&resource_path).ok();

    let wav_path = temp_path("e2e-input.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
    for i in 0..8_000 {
        let v = ((i as f32 * 0.05).sin() * 8_000.0) as i16;
        writer.write_sample(v).unwrap();
    }
    writer.finalize().unwrap();

    let eot = resources.vocab.special().eot;
    let engine = EngineHandle::new(StubEngine::repeating(vec![0, eot]));
    let pipeline = FeaturePipeline::new(resources, engine, 2);

    let out = pipeline.transcribe_file(&wav_path).unwrap();
    std::fs::remove_file(&wav_path).ok();
    assert_eq!(out.text, "ok");
}

#[test]
fn wrong_sample_rate_is_rejected() {
    let resource_path = temp_path("e2e-rate-resource.bin");
    write_resource(&resource_path, &["ok"]);
    let resources = Arc::new(resource::load(&resource_path, LanguageMode::English).unwrap());
    std::fs::remove_file(&resource_path).ok();

    let wav_path = temp_path("e2e-44k.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();

    let engine = EngineHandle::new(StubEngine::repeating(vec![0]));
    let pipeline = FeaturePipeline::new(resources, engine, 1);

    let err = pipeline.transcribe_file(&wav_path).unwrap_err();
    std::fs::remove_file(&wav_path).ok();
    assert!(matches!(err, murmur_core::MurmurError::InvalidAudio(_)));
}
