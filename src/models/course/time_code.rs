//! Compact day+periods encoding used by stored course records.
//!
//! The first digit is the day (1 = Monday .. 5 = Friday) and every following
//! digit is one period, so "289" is Tuesday periods 8 and 9. Periods are
//! therefore limited to 1-9.

use std::collections::BTreeSet;

use super::CourseValidationError;
use crate::models::slot::Day;

/// Highest period the encoding can express.
pub const MAX_ENCODED_PERIOD: u8 = 9;

/// Decode a time code into its day and ordered period set.
pub fn decode(code: &str) -> Result<(Day, BTreeSet<u8>), CourseValidationError> {
    let malformed = || CourseValidationError::MalformedTime(code.to_string());

    let code = code.trim();
    let mut digits = code.chars().map(|c| c.to_digit(10).map(|d| d as u8));

    let day = digits
        .next()
        .flatten()
        .and_then(Day::from_number)
        .ok_or_else(malformed)?;

    let mut periods = BTreeSet::new();
    for digit in digits {
        match digit {
            Some(period) if period >= 1 => {
                if !periods.insert(period) {
                    return Err(malformed());
                }
            }
            _ => return Err(malformed()),
        }
    }

    if periods.is_empty() {
        return Err(malformed());
    }

    Ok((day, periods))
}

/// Encode a day and period set; periods are emitted in ascending order.
pub fn encode(day: Day, periods: &BTreeSet<u8>) -> Result<String, CourseValidationError> {
    if periods.is_empty() {
        return Err(CourseValidationError::NoPeriods);
    }

    let mut code = day.number().to_string();
    for &period in periods {
        if period == 0 || period > MAX_ENCODED_PERIOD {
            return Err(CourseValidationError::PeriodOutOfRange {
                period,
                max: MAX_ENCODED_PERIOD,
            });
        }
        code.push(char::from(b'0' + period));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_decode_example() {
        let (day, periods) = decode("289").unwrap();
        assert_eq!(day, Day::Tuesday);
        assert_eq!(periods.into_iter().collect::<Vec<_>>(), vec![8, 9]);
    }

    #[test]
    fn test_decode_orders_periods() {
        let (day, periods) = decode("5312").unwrap();
        assert_eq!(day, Day::Friday);
        assert_eq!(periods.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test_case("" ; "empty")]
    #[test_case("1" ; "day only")]
    #[test_case("612" ; "day out of range")]
    #[test_case("012" ; "day zero")]
    #[test_case("120" ; "period zero")]
    #[test_case("1a2" ; "non digit")]
    #[test_case("1223" ; "duplicate period")]
    fn test_decode_rejects(code: &str) {
        assert!(matches!(
            decode(code),
            Err(CourseValidationError::MalformedTime(_))
        ));
    }

    #[test]
    fn test_encode() {
        let periods: BTreeSet<u8> = [9, 8].into_iter().collect();
        assert_eq!(encode(Day::Tuesday, &periods).unwrap(), "289");
    }

    #[test]
    fn test_encode_rejects_unencodable_period() {
        let periods: BTreeSet<u8> = [10].into_iter().collect();
        assert_eq!(
            encode(Day::Monday, &periods),
            Err(CourseValidationError::PeriodOutOfRange { period: 10, max: 9 })
        );
        assert_eq!(
            encode(Day::Monday, &BTreeSet::new()),
            Err(CourseValidationError::NoPeriods)
        );
    }
}
