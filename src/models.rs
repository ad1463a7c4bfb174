use serde::Deserialize;

/// Validated movie fields, ready for the store.
#[derive(Clone, Debug)]
pub struct NewMovie {
    pub name: String,
    pub director: String,
    pub year: i32,
    pub rating: Option<f64>,
}

/// Validated review fields.
#[derive(Clone, Debug)]
pub struct NewReview {
    pub text: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !looks_like_email(self.email.trim()) {
            errors.push("Email address is not valid.".to_string());
        }
        if self.password.len() < 6 {
            errors.push("Password must be at least 6 characters long.".to_string());
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self, admin_email: &str) -> Vec<String> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        if name.is_empty() || name.len() > 100 {
            errors.push("Name must be between 1 and 100 characters.".to_string());
        }
        let email = self.email.trim();
        if !looks_like_email(email) || email.len() > 120 {
            errors.push("Email address is not valid.".to_string());
        } else if email == admin_email {
            errors.push("You cannot register with this email.".to_string());
        }
        if self.password.len() < 6 {
            errors.push("Password must be at least 6 characters long.".to_string());
        }
        errors
    }
}

/// Add/update movie form. `year` and `rating` come in as raw strings so a
/// bad value surfaces as a field error instead of a rejected request body.
#[derive(Debug, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub genres: Vec<i32>,
}

impl MovieForm {
    pub fn validate(&self) -> Result<NewMovie, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("Name is required.".to_string());
        }
        let director = self.director.trim();
        if director.is_empty() {
            errors.push("Director is required.".to_string());
        }

        let year = match self.year.trim().parse::<i32>() {
            Ok(year) if (1888..=2100).contains(&year) => Some(year),
            Ok(_) => {
                errors.push("Year must be between 1888 and 2100.".to_string());
                None
            },
            Err(_) => {
                errors.push("Year must be a whole number.".to_string());
                None
            },
        };

        let rating = match parse_rating(&self.rating) {
            Ok(rating) => rating,
            Err(message) => {
                errors.push(message);
                None
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewMovie {
            name: name.to_string(),
            director: director.to_string(),
            year: year.unwrap_or_default(),
            rating,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: String,
}

impl ReviewForm {
    pub fn validate(&self) -> Result<NewReview, Vec<String>> {
        let mut errors = Vec::new();

        let text = self.review.trim();
        if text.is_empty() {
            errors.push("Review text is required.".to_string());
        }

        let rating = match parse_rating(&self.rating) {
            Ok(rating) => rating,
            Err(message) => {
                errors.push(message);
                None
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewReview { text: text.to_string(), rating })
    }
}

#[derive(Debug, Deserialize)]
pub struct GenreForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GenreForm {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required.".to_string());
        }
        if self.description.trim().is_empty() {
            errors.push("Description is required.".to_string());
        }
        errors
    }
}

fn parse_rating(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(rating) if (0.0..=10.0).contains(&rating) => Ok(Some(rating)),
        Ok(_) => Err("Rating must be between 0 and 10.".to_string()),
        Err(_) => Err("Rating must be a number.".to_string()),
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_form(name: &str, director: &str, year: &str, rating: &str) -> MovieForm {
        MovieForm {
            name: name.to_string(),
            director: director.to_string(),
            year: year.to_string(),
            rating: rating.to_string(),
            genres: Vec::new(),
        }
    }

    #[test]
    fn movie_form_accepts_valid_input() {
        let movie = movie_form("Arrival", "Denis Villeneuve", "2016", "8.5").validate().unwrap();
        assert_eq!(movie.name, "Arrival");
        assert_eq!(movie.year, 2016);
        assert_eq!(movie.rating, Some(8.5));
    }

    #[test]
    fn movie_form_rating_is_optional() {
        let movie = movie_form("Arrival", "Denis Villeneuve", "2016", "").validate().unwrap();
        assert_eq!(movie.rating, None);
    }

    #[test]
    fn movie_form_rejects_out_of_range_year() {
        let errors = movie_form("Arrival", "Denis Villeneuve", "1800", "7").validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("between 1888 and 2100")));
    }

    #[test]
    fn movie_form_collects_all_field_errors() {
        let errors = movie_form("", "", "soon", "eleven").validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert_eq!(parse_rating("0").unwrap(), Some(0.0));
        assert_eq!(parse_rating("10").unwrap(), Some(10.0));
        assert!(parse_rating("10.1").is_err());
    }

    #[test]
    fn signup_rejects_admin_email() {
        let form = SignupForm {
            name: "Mallory".to_string(),
            email: "admin@admin.com".to_string(),
            password: "hunter22".to_string(),
        };
        let errors = form.validate("admin@admin.com");
        assert!(errors.iter().any(|e| e.contains("cannot register")));
    }

    #[test]
    fn signup_enforces_password_length() {
        let form = SignupForm {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password: "short".to_string(),
        };
        let errors = form.validate("admin@admin.com");
        assert!(errors.iter().any(|e| e.contains("at least 6")));
    }

    #[test]
    fn email_shape_checks() {
        assert!(looks_like_email("a@x.com"));
        assert!(!looks_like_email("plainaddress"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@nodot"));
        assert!(!looks_like_email("a@.com"));
    }
}
