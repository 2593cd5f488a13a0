//! バイトストリーム上のフレーム: `tag: i32 LE | len: u32 LE | payload`

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::CommError;

/// 1フレームのペイロード上限
pub const MAX_FRAME_LEN: usize = 1 << 20;

pub fn write_frame<W: Write>(w: &mut W, tag: i32, payload: &[u8]) -> Result<(), CommError> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|&n| n as usize <= MAX_FRAME_LEN)
        .ok_or_else(|| CommError::Frame(format!("payload too large: {} bytes", payload.len())))?;
    w.write_i32::<LittleEndian>(tag)?;
    w.write_u32::<LittleEndian>(len)?;
    w.write_all(payload)?;
    w.flush()?;
    Ok(())
}

/// 1フレーム読む。フレーム境界で EOF なら `None`
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<(i32, Vec<u8>)>, CommError> {
    let tag = match r.read_i32::<LittleEndian>() {
        Ok(tag) => tag,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let len = r.read_u32::<LittleEndian>()? as usize;
    if len > MAX_FRAME_LEN {
        return Err(CommError::Frame(format!("frame length {len} exceeds limit")));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok(Some((tag, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frames_in_sequence() {
        let mut buf = Vec::new();
        write_frame(&mut buf, 3, b"abc").unwrap();
        write_frame(&mut buf, 1000, &[0]).unwrap();
        assert_eq!(buf.len(), 8 + 3 + 8 + 1);

        let mut r = Cursor::new(buf);
        assert_eq!(read_frame(&mut r).unwrap(), Some((3, b"abc".to_vec())));
        assert_eq!(read_frame(&mut r).unwrap(), Some((1000, vec![0])));
        assert_eq!(read_frame(&mut r).unwrap(), None);
    }

    #[test]
    fn test_truncated_frame_is_error() {
        let mut buf = Vec::new();
        write_frame(&mut buf, 7, &[1, 2, 3, 4]).unwrap();
        buf.truncate(10);
        let mut r = Cursor::new(buf);
        assert!(matches!(read_frame(&mut r), Err(CommError::Io(_))));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        let mut r = Cursor::new(buf);
        assert!(matches!(read_frame(&mut r), Err(CommError::Frame(_))));
    }
}
