/*!
    Conversion of packets and decoder status codes for the FFmpeg decoders.
*/

use ffmpeg_next::{ffi, packet::Mut as PacketMut};

use media_source::convert::codec_error;
use media_types::{Packet, Result};

use crate::decoder::Submit;

/**
    Copy a packet into an FFmpeg packet, carrying its timing and keyframe flag.
*/
pub(crate) fn packet_to_ffmpeg(packet: &Packet) -> ffmpeg_next::Packet {
    let mut ffmpeg_pkt = if packet.data.is_empty() {
        ffmpeg_next::Packet::empty()
    } else {
        ffmpeg_next::Packet::copy(&packet.data)
    };

    // SAFETY: the packet was just allocated and is exclusively owned here.
    unsafe {
        let pkt_ptr = ffmpeg_pkt.as_mut_ptr();
        if let Some(pts) = packet.pts {
            (*pkt_ptr).pts = pts.0;
        }
        if let Some(dts) = packet.dts {
            (*pkt_ptr).dts = dts.0;
        }
        (*pkt_ptr).duration = packet.duration.0;
        if packet.is_keyframe {
            (*pkt_ptr).flags |= ffi::AV_PKT_FLAG_KEY as i32;
        }
    }

    ffmpeg_pkt
}

/**
    Map the result of `send_packet`/`send_eof`.

    EAGAIN means the decoder buffer is full and frames must be received
    first. EOF after end-of-stream was already signalled is not an error.
*/
pub(crate) fn submit_status(result: std::result::Result<(), ffmpeg_next::Error>) -> Result<Submit> {
    match result {
        Ok(()) => Ok(Submit::Accepted),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(Submit::Full),
        Err(ffmpeg_next::Error::Eof) => Ok(Submit::Accepted),
        Err(e) => Err(codec_error(e)),
    }
}

/**
    Outcome of `receive_frame`.
*/
pub(crate) enum Receive {
    Frame,
    NeedMoreInput,
    EndOfStream,
}

pub(crate) fn receive_status(result: std::result::Result<(), ffmpeg_next::Error>) -> Result<Receive> {
    match result {
        Ok(()) => Ok(Receive::Frame),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
            Ok(Receive::NeedMoreInput)
        }
        Err(ffmpeg_next::Error::Eof) => Ok(Receive::EndOfStream),
        Err(e) => Err(codec_error(e)),
    }
}
