//! End-to-end tests driving the listener with synthetic tones.

use ocarina_core::notes::{FILLER, center_frequency};
use ocarina_core::{
    AudioSource, CaptureError, DeliveryError, Dispatcher, Listener, ListenerConfig, Note,
    Notifier, SongEvent,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::rc::Rc;

const RATE: u32 = 48_000;
const SIZE: usize = 2048;

fn tone(freq: f32) -> Vec<i16> {
    (0..SIZE)
        .map(|n| {
            let t = n as f32 / RATE as f32;
            (0.5 * 32767.0 * (2.0 * PI * freq * t).sin()).round() as i16
        })
        .collect()
}

fn note_frame(note: Note) -> Vec<i16> {
    tone(center_frequency(note))
}

/// Two frames per note: one to settle, one to confirm.
fn melody(notes: &[Note]) -> Vec<Vec<i16>> {
    notes
        .iter()
        .flat_map(|&note| [note_frame(note), note_frame(note)])
        .collect()
}

struct ScriptedSource {
    frames: VecDeque<Vec<i16>>,
}

impl AudioSource for ScriptedSource {
    fn read_frame(&mut self) -> Result<Vec<i16>, CaptureError> {
        self.frames.pop_front().ok_or(CaptureError::Disconnected)
    }
}

struct Collector(Rc<RefCell<Vec<u8>>>);

impl Notifier for Collector {
    fn name(&self) -> &str {
        "collector"
    }

    fn publish(&self, event: &SongEvent) -> Result<(), DeliveryError> {
        self.0.borrow_mut().push(event.song_id);
        Ok(())
    }
}

#[test]
fn held_tone_emits_one_note() {
    let mut listener = Listener::default();

    listener.process_frame(&note_frame(Note::A)).unwrap();
    assert_eq!(listener.history().last(), FILLER);

    listener.process_frame(&note_frame(Note::A)).unwrap();
    assert_eq!(listener.history().last(), Note::A);

    for _ in 0..5 {
        listener.process_frame(&note_frame(Note::A)).unwrap();
    }
    let snapshot = listener.history().snapshot();
    assert_eq!(snapshot.iter().filter(|&&n| n == Note::A).count(), 1);
}

#[test]
fn silent_frames_play_nothing() {
    let mut listener = Listener::default();
    for _ in 0..4 {
        assert_eq!(listener.process_frame(&vec![0; SIZE]), Ok(None));
    }
    assert_eq!(listener.history().snapshot(), vec![FILLER; 6]);
}

#[test]
fn every_default_song_is_recognised_on_its_last_note() {
    let config = ListenerConfig::default();
    for song in &config.songs {
        let mut listener = Listener::new(&config);
        let mut events = Vec::new();
        for (i, frame) in melody(&song.notes).iter().enumerate() {
            if let Some(event) = listener.process_frame(frame).unwrap() {
                events.push((i, event.song_id));
            }
        }
        assert_eq!(events, vec![(11, song.id)], "{}", song.label);
    }
}

#[test]
fn song_fires_once_even_while_the_last_note_is_held() {
    let mut listener = Listener::default();
    use Note::*;
    let mut frames = melody(&[A, E, D5, A, E, D5]);
    frames.extend(std::iter::repeat_n(note_frame(D5), 10));

    let fired = frames
        .iter()
        .filter_map(|f| listener.process_frame(f).unwrap())
        .count();
    assert_eq!(fired, 1);
    // The held note re-enters once after the filler, then stays debounced.
    assert_eq!(listener.history().snapshot(), vec![D5, A, E, D5, FILLER, D5]);
}

#[test]
fn run_dispatches_until_the_source_ends() {
    use Note::*;
    let mut frames = melody(&[A, E, D5, A, E, D5]);
    frames.push(vec![0; 100]);
    frames.extend(melody(&[E, A, B, E, A, B]));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = Dispatcher::default().with_notifier(Box::new(Collector(seen.clone())));
    let mut source = ScriptedSource {
        frames: frames.into(),
    };

    let result = Listener::default().run(&mut source, &dispatcher);

    assert!(matches!(result, Err(CaptureError::Disconnected)));
    assert_eq!(*seen.borrow(), vec![1, 5]);
}
