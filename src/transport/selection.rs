//! Track selection policy
//!
//! Pure functions deciding which tracks take part in an operation. Results
//! keep the track list's order. An empty result is not an error: the caller
//! decides whether to create tracks or give up.

use std::sync::Arc;

use crate::project::Project;
use crate::tracks::{Track, TrackList, TransportTracks, WaveTrackArray};

/// Tracks that can receive newly recorded audio.
///
/// Every record-armed wave track is eligible, restricted to the selected ones
/// when `selected_only` is set. A `target_rate` excludes every track at
/// another rate.
///
/// `channel_fit` additionally matches the result to an input channel count.
/// With one or two channels the rule is strict: the result is the first
/// unbroken run of eligible tracks whose channel counts add up to exactly
/// that many, so no input is dropped and no track is half filled. With more
/// channels only selected tracks are considered, and the earliest ones are
/// taken until there are enough channels; fewer channels than inputs is
/// accepted as long as at least one track was found.
pub fn choose_existing_recording_tracks(
    project: &Project,
    selected_only: bool,
    target_rate: Option<u32>,
    channel_fit: Option<u16>,
) -> WaveTrackArray {
    let pool = if selected_only {
        project.tracks().selected_wave_tracks()
    } else {
        project.tracks().wave_tracks()
    };

    let eligible = pool.into_iter().filter(|track| {
        track.is_record_armed() && target_rate.map_or(true, |rate| track.rate() == Some(rate))
    });

    match channel_fit {
        Some(channels) => fit_channels(eligible, selected_only, usize::from(channels)),
        None => eligible.collect(),
    }
}

fn fit_channels(
    eligible: impl Iterator<Item = Arc<Track>>,
    selected_only: bool,
    wanted: usize,
) -> WaveTrackArray {
    let strict = wanted <= 2;
    if !strict && !selected_only {
        return Vec::new();
    }

    let mut candidates: Vec<Arc<Track>> = Vec::new();
    let mut total_channels = 0usize;

    for track in eligible {
        let channels = usize::from(track.channels());
        if strict && channels > wanted {
            // This track would be under-filled; nothing gathered so far can
            // be used either.
            candidates.clear();
            total_channels = 0;
            continue;
        }

        while strict && total_channels + channels > wanted {
            let dropped = candidates.remove(0);
            total_channels -= usize::from(dropped.channels());
        }

        candidates.push(track);
        total_channels += channels;
        if total_channels >= wanted {
            return candidates;
        }
    }

    if !strict && !candidates.is_empty() {
        return candidates;
    }

    Vec::new()
}

/// Every playable track of the list, as the playback set of an operation.
///
/// Wave tracks go to `playback_tracks`; with `non_wave_too`, playable tracks
/// without audio (note tracks) go to `other_playable_tracks`.
pub fn get_all_playback_tracks(
    tracks: &TrackList,
    selected_only: bool,
    non_wave_too: bool,
) -> TransportTracks {
    let mut result = TransportTracks::default();

    for track in tracks.tracks() {
        if selected_only && !track.is_selected() {
            continue;
        }
        if track.is_wave() {
            result.playback_tracks.push(track);
        } else if non_wave_too && track.is_playable() {
            result.other_playable_tracks.push(track);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{TrackId, TrackKind};

    fn add(project: &Project, name: &str, rate: u32, channels: u16) -> Arc<Track> {
        let track = project.tracks().add_track(
            name,
            TrackKind::Wave { rate, channels },
            0.0,
            1.0,
        );
        track.set_record_armed(true);
        track
    }

    fn ids(tracks: &[Arc<Track>]) -> Vec<TrackId> {
        tracks.iter().map(|t| t.id()).collect()
    }

    #[test]
    fn test_every_armed_track_at_rate_is_eligible() {
        let project = Project::new("P", 44100);
        let mono = add(&project, "Mono", 44100, 1);
        let stereo = add(&project, "Stereo", 44100, 2);
        add(&project, "Other", 48000, 1);

        let chosen = choose_existing_recording_tracks(&project, false, Some(44100), None);
        assert_eq!(ids(&chosen), vec![mono.id(), stereo.id()]);

        let chosen = choose_existing_recording_tracks(&project, false, None, None);
        assert_eq!(chosen.len(), 3);
    }

    #[test]
    fn test_stereo_input_takes_one_stereo_track() {
        let project = Project::new("P", 44100);
        let stereo = add(&project, "Stereo", 44100, 2);

        let chosen = choose_existing_recording_tracks(&project, false, None, Some(2));
        assert_eq!(ids(&chosen), vec![stereo.id()]);
    }

    #[test]
    fn test_stereo_input_takes_two_adjacent_mono_tracks() {
        let project = Project::new("P", 44100);
        let a = add(&project, "A", 44100, 1);
        let b = add(&project, "B", 44100, 1);
        add(&project, "C", 44100, 1);

        let chosen = choose_existing_recording_tracks(&project, false, None, Some(2));
        assert_eq!(ids(&chosen), vec![a.id(), b.id()]);
    }

    #[test]
    fn test_single_mono_track_cannot_take_stereo_input() {
        let project = Project::new("P", 44100);
        add(&project, "Mono", 44100, 1);

        assert!(choose_existing_recording_tracks(&project, false, None, Some(2)).is_empty());
    }

    #[test]
    fn test_wide_track_resets_the_run() {
        let project = Project::new("P", 44100);
        add(&project, "A", 44100, 1);
        add(&project, "Wide", 44100, 3);
        let c = add(&project, "C", 44100, 1);

        let chosen = choose_existing_recording_tracks(&project, false, None, Some(1));
        // The first mono track already satisfies a mono input.
        assert_eq!(chosen.len(), 1);
        assert_ne!(chosen[0].id(), c.id());

        let chosen = choose_existing_recording_tracks(&project, false, None, Some(2));
        assert!(chosen.is_empty(), "A and C are not contiguous candidates");
    }

    #[test]
    fn test_over_full_run_drops_earliest() {
        let project = Project::new("P", 44100);
        add(&project, "Mono", 44100, 1);
        let stereo = add(&project, "Stereo", 44100, 2);

        let chosen = choose_existing_recording_tracks(&project, false, None, Some(2));
        assert_eq!(ids(&chosen), vec![stereo.id()]);
    }

    #[test]
    fn test_target_rate_filters_tracks() {
        let project = Project::new("P", 44100);
        add(&project, "CD", 44100, 1);
        let dvd = add(&project, "DVD", 48000, 1);

        let chosen = choose_existing_recording_tracks(&project, false, Some(48000), None);
        assert_eq!(ids(&chosen), vec![dvd.id()]);
        assert!(chosen.iter().all(|t| t.rate() == Some(48000)));

        assert!(choose_existing_recording_tracks(&project, false, Some(96000), None).is_empty());
    }

    #[test]
    fn test_unarmed_tracks_are_never_chosen() {
        let project = Project::new("P", 44100);
        let track = add(&project, "A", 44100, 1);
        track.set_record_armed(false);

        assert!(choose_existing_recording_tracks(&project, false, None, None).is_empty());
    }

    #[test]
    fn test_selected_only_restricts_pool() {
        let project = Project::new("P", 44100);
        add(&project, "A", 44100, 1);
        let b = add(&project, "B", 44100, 1);
        b.set_selected(true);

        let chosen = choose_existing_recording_tracks(&project, true, None, None);
        assert_eq!(ids(&chosen), vec![b.id()]);
    }

    #[test]
    fn test_many_channels_require_selection() {
        let project = Project::new("P", 44100);
        let a = add(&project, "A", 44100, 2);
        let b = add(&project, "B", 44100, 1);

        assert!(choose_existing_recording_tracks(&project, false, None, Some(8)).is_empty());

        a.set_selected(true);
        b.set_selected(true);
        let chosen = choose_existing_recording_tracks(&project, true, None, Some(8));
        assert_eq!(ids(&chosen), vec![a.id(), b.id()]);
    }

    #[test]
    fn test_many_channels_stop_when_enough() {
        let project = Project::new("P", 44100);
        let tracks: Vec<_> = (0..4)
            .map(|i| {
                let t = add(&project, &format!("T{}", i), 44100, 2);
                t.set_selected(true);
                t
            })
            .collect();

        let chosen = choose_existing_recording_tracks(&project, true, None, Some(4));
        assert_eq!(ids(&chosen), vec![tracks[0].id(), tracks[1].id()]);
    }

    #[test]
    fn test_playback_tracks_keep_order() {
        let project = Project::new("P", 44100);
        let list = project.tracks();
        let a = list.add_wave_track("A", 44100);
        let notes = list.add_track("Notes", TrackKind::Note, 0.0, 1.0);
        list.add_track("Labels", TrackKind::Label, 0.0, 1.0);
        let b = list.add_wave_track("B", 48000);

        let tracks = get_all_playback_tracks(list, false, false);
        assert_eq!(ids(&tracks.playback_tracks), vec![a.id(), b.id()]);
        assert!(tracks.other_playable_tracks.is_empty());

        let tracks = get_all_playback_tracks(list, false, true);
        assert_eq!(ids(&tracks.other_playable_tracks), vec![notes.id()]);
        assert!(!tracks.has_capture());
    }

    #[test]
    fn test_playback_tracks_selected_only() {
        let project = Project::new("P", 44100);
        let list = project.tracks();
        list.add_wave_track("A", 44100);
        let b = list.add_wave_track("B", 44100);
        b.set_selected(true);

        let tracks = get_all_playback_tracks(list, true, true);
        assert_eq!(ids(&tracks.playback_tracks), vec![b.id()]);
    }
}
